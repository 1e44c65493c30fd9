//! Core traits for the filtering pipeline.
//!
//! This module defines the FilterStage trait that allows composable,
//! optional filters to be added to a query.

use crate::error::Result;
use crate::request::RequestParams;
use records::Query;

/// A single optional filter, activated by one request parameter.
///
/// All stages must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows one pipeline to serve concurrent requests
/// - The request is passed in explicitly; stages hold configuration only
/// - `apply` only adds constraints and never executes the query
pub trait FilterStage: Send + Sync {
    /// Name of the request parameter that activates this stage.
    fn trigger_key(&self) -> &str;

    /// Add this stage's constraint to `query`.
    ///
    /// Only called when `request` contains `trigger_key()`; the stage reads
    /// its value from there.
    ///
    /// # Returns
    /// * `Ok(Query)` - the query with the constraint appended
    /// * `Err(InvalidFilterValue)` - the parameter value is unusable
    fn apply(&self, query: Query, request: &RequestParams) -> Result<Query>;
}
