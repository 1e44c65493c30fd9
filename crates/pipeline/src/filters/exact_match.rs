//! Filter on an exact field value.

use crate::error::Result;
use crate::request::RequestParams;
use crate::traits::FilterStage;
use records::Query;

/// Keeps records whose field equals the parameter value exactly.
///
/// `?role=admin` becomes `role = "admin"`. Integer fields compare by
/// their decimal form, so `?age=30` works too.
pub struct ExactMatch {
    key: String,
    field: String,
}

impl ExactMatch {
    /// Filter the field with the same name as the parameter.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
        }
    }

    /// Constrain a differently named field.
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl FilterStage for ExactMatch {
    fn trigger_key(&self) -> &str {
        &self.key
    }

    fn apply(&self, query: Query, request: &RequestParams) -> Result<Query> {
        let value = request.require(&self.key)?;
        Ok(query.where_eq(&self.field, value))
    }
}
