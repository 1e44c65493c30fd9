//! Pipeline for composing optional query filters.
//!
//! This crate provides:
//! - FilterStage trait and implementations for request-driven filters
//! - FilterPipeline for composing stages into one query transformation
//! - RequestParams, the inbound parameter map stages read from
//!
//! ## Architecture
//! A request flows through the pipeline once:
//! 1. Each stage whose trigger key is present adds one constraint
//! 2. Stages compose in reverse registration order (see `FilterPipeline::run`)
//! 3. The finished `Query` is handed to a repository for execution
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, RequestParams};
//! use pipeline::filters::*;
//! use records::{Query, User};
//!
//! // Build the pipeline once per resource type
//! let pipeline = FilterPipeline::new()
//!     .add_stage(Search::new("name"))?
//!     .add_stage(ExactMatch::new("role"))?
//!     .add_stage(NumericRange::new("age"))?
//!     .add_stage(Sort::new("sort", ["name", "age"]))?;
//!
//! // Run it per request
//! let request = RequestParams::from_query_string("name=lee&age=18,30");
//! let query = pipeline.run(&request, Query::for_record::<User>())?;
//! ```

pub mod error;
pub mod filter_pipeline;
pub mod filters;
pub mod request;
pub mod traits;

// Re-export main types
pub use error::{PipelineError, Result};
pub use filter_pipeline::FilterPipeline;
pub use request::RequestParams;
pub use traits::FilterStage;
