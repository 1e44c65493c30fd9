//! Filter stage implementations.
//!
//! This module contains the concrete stages that can be composed
//! into a FilterPipeline. Each one is configured with the request
//! parameter that activates it and the record field it constrains.

pub mod exact_match;
pub mod limit;
pub mod numeric_range;
pub mod search;
pub mod sort;

// Re-export for convenience
pub use exact_match::ExactMatch;
pub use limit::Limit;
pub use numeric_range::NumericRange;
pub use search::Search;
pub use sort::Sort;
