//! # Records Crate
//!
//! Shared record model for the roster workspace.
//!
//! ## Main Components
//!
//! - **types**: `RecordId`, `FieldValue`, the `Record` trait and the `User` resource
//! - **query**: `Query` accumulator and its `Constraint`s
//! - **parser**: load user seed files
//! - **error**: error types for validation and loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use records::{Query, Record, SortDirection, User, UserDraft};
//!
//! let ann = User::from_draft(1, UserDraft::new("Ann", "ann@example.com"))?;
//!
//! let query = Query::for_record::<User>()
//!     .where_contains("name", "an")
//!     .order_by("name", SortDirection::Asc);
//! let rows = query.execute(vec![ann]);
//! ```

pub mod error;
pub mod parser;
pub mod query;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{RecordError, Result};
pub use query::{Constraint, Query, SortDirection};
pub use types::{DEFAULT_ROLE, FieldValue, Record, RecordId, User, UserDraft, UserPatch};
