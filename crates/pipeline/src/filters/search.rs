//! Substring search on a text field.

use crate::error::{PipelineError, Result};
use crate::request::RequestParams;
use crate::traits::FilterStage;
use records::Query;

/// Keeps records whose field contains the parameter value, ignoring case.
///
/// Surrounding whitespace is trimmed; a blank search term is rejected
/// rather than silently matching everything.
pub struct Search {
    key: String,
    field: String,
}

impl Search {
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
}

impl FilterStage for Search {
    fn trigger_key(&self) -> &str {
        &self.key
    }

    fn apply(&self, query: Query, request: &RequestParams) -> Result<Query> {
        let raw = request.require(&self.key)?;
        let needle = raw.trim();
        if needle.is_empty() {
            return Err(PipelineError::invalid_value(
                &self.key,
                raw,
                "search term must not be blank",
            ));
        }
        Ok(query.where_contains(&self.field, needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::Constraint;

    #[test]
    fn test_search_trims_term() {
        let stage = Search::new("name");
        let request = RequestParams::new().with("name", "  lee ");

        let query = stage.apply(Query::new("users"), &request).unwrap();
        assert_eq!(
            query.constraints(),
            &[Constraint::Contains {
                field: "name".to_string(),
                needle: "lee".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_search_rejected() {
        let stage = Search::new("q").on_field("name");
        let request = RequestParams::new().with("q", "   ");

        let err = stage.apply(Query::new("users"), &request).unwrap_err();
        assert_eq!(err.trigger_key(), Some("q"));
    }
}
