//! Row cap stage.

use crate::error::{PipelineError, Result};
use crate::request::RequestParams;
use crate::traits::FilterStage;
use records::Query;

/// Caps the number of rows the query yields.
///
/// The value must be a positive integer no greater than `max`.
pub struct Limit {
    key: String,
    max: usize,
}

impl Limit {
    pub fn new(key: impl Into<String>, max: usize) -> Self {
        Self {
            key: key.into(),
            max,
        }
    }
}

impl FilterStage for Limit {
    fn trigger_key(&self) -> &str {
        &self.key
    }

    fn apply(&self, query: Query, request: &RequestParams) -> Result<Query> {
        let raw = request.require(&self.key)?;
        let count = request.parse::<usize>(&self.key)?.unwrap_or_default();
        if count == 0 || count > self.max {
            return Err(PipelineError::invalid_value(
                &self.key,
                raw,
                format!("must be between 1 and {}", self.max),
            ));
        }
        Ok(query.limit(count))
    }
}
