//! Error types for the records crate.
//!
//! Covers two failure families:
//! - record validation (a draft or patch breaks a field invariant)
//! - seed file loading (I/O and line parsing)

use thiserror::Error;

/// Errors raised while building, validating or loading records
#[derive(Error, Debug)]
pub enum RecordError {
    /// Seed file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a seed file couldn't be parsed
    ///
    /// Carries the file name and 1-based line number for context
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A record broke one of its field invariants
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl RecordError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecordError>;
