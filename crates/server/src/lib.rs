//! Server crate for the user roster.
//!
//! This crate contains the controller that coordinates the filter pipeline,
//! the user repository and file storage behind the user endpoints.

pub mod controller;
pub mod error;
pub mod users;

pub use controller::{ControllerConfig, ProfilePicture, UserController};
pub use error::{ControllerError, Result};
pub use users::users_pipeline;
