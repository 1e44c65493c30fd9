//! Inclusive integer range filter.
//!
//! Accepted parameter forms:
//! - `18,30` both bounds
//! - `18,` lower bound only
//! - `,30` upper bound only
//! - `25` exact value (both bounds equal)

use crate::error::{PipelineError, Result};
use crate::request::RequestParams;
use crate::traits::FilterStage;
use records::Query;

/// Keeps records whose integer field lies within the requested bounds.
///
/// Records with a missing value never match.
pub struct NumericRange {
    key: String,
    field: String,
}

impl NumericRange {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
        }
    }

    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Parse a raw parameter into `(min, max)`.
    fn parse_bounds(&self, raw: &str) -> Result<(Option<i64>, Option<i64>)> {
        let invalid = |reason: &str| PipelineError::invalid_value(&self.key, raw, reason);
        let bound = |part: &str| -> Result<Option<i64>> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            part.parse::<i64>()
                .map(Some)
                .map_err(|_| invalid("bounds must be integers"))
        };

        let (min, max) = match raw.split_once(',') {
            Some((lo, hi)) => (bound(lo)?, bound(hi)?),
            None => {
                let exact = bound(raw)?;
                (exact, exact)
            }
        };

        match (min, max) {
            (None, None) => Err(invalid("at least one bound is required")),
            (Some(lo), Some(hi)) if lo > hi => Err(invalid("lower bound exceeds upper bound")),
            bounds => Ok(bounds),
        }
    }
}

impl FilterStage for NumericRange {
    fn trigger_key(&self) -> &str {
        &self.key
    }

    fn apply(&self, query: Query, request: &RequestParams) -> Result<Query> {
        let raw = request.require(&self.key)?;
        let (min, max) = self.parse_bounds(raw)?;
        Ok(query.where_between(&self.field, min, max))
    }
}
