//! Ordering stage.
//!
//! Unlike the narrowing stages, a sort is order-sensitive: its position in
//! the composed query decides which rows a later `Limit` keeps.

use crate::error::{PipelineError, Result};
use crate::request::RequestParams;
use crate::traits::FilterStage;
use records::{Query, SortDirection};

/// Sorts by the requested field: `?sort=name` ascending, `?sort=-name`
/// descending. Only whitelisted fields are accepted.
pub struct Sort {
    key: String,
    allowed_fields: Vec<String>,
}

impl Sort {
    /// # Arguments
    /// * `key` - Request parameter carrying the sort spec (typically "sort")
    /// * `allowed_fields` - Fields callers may sort on
    pub fn new<I, S>(key: impl Into<String>, allowed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            allowed_fields: allowed_fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl FilterStage for Sort {
    fn trigger_key(&self) -> &str {
        &self.key
    }

    fn apply(&self, query: Query, request: &RequestParams) -> Result<Query> {
        let raw = request.require(&self.key)?;
        let spec = raw.trim();
        let (field, direction) = match spec.strip_prefix('-') {
            Some(field) => (field, SortDirection::Desc),
            None => (spec, SortDirection::Asc),
        };

        if !self.allowed_fields.iter().any(|allowed| allowed == field) {
            return Err(PipelineError::invalid_value(
                &self.key,
                raw,
                format!("cannot sort by '{field}'"),
            ));
        }

        Ok(query.order_by(field, direction))
    }
}
