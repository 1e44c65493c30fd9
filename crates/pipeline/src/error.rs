//! Error types for filter composition.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A present filter parameter could not be converted to what its stage needs.
    ///
    /// Aborts the whole run; no partially filtered query is returned.
    #[error("Invalid value '{value}' for filter '{key}': {reason}")]
    InvalidFilterValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Two stages in one pipeline share a trigger key
    #[error("Filter '{0}' is registered more than once")]
    DuplicateFilterDefinition(String),

    /// The inbound parameters could not be read as a flat key/value map
    #[error("Malformed request parameters: {0}")]
    MalformedRequest(String),
}

impl PipelineError {
    pub fn invalid_value(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// The trigger key this error is about, if any
    pub fn trigger_key(&self) -> Option<&str> {
        match self {
            Self::InvalidFilterValue { key, .. } => Some(key),
            Self::DuplicateFilterDefinition(key) => Some(key),
            Self::MalformedRequest(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
