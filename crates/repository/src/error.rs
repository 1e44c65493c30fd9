//! Error types for the repository crate.

use records::{RecordError, RecordId};
use thiserror::Error;

/// Errors returned by repository operations
#[derive(Error, Debug)]
pub enum RepoError {
    /// No active record with this id (never created, or destroyed)
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// A draft or patch broke the record's invariants
    #[error(transparent)]
    Validation(#[from] RecordError),

    /// A query built for one collection was run against another
    #[error("Query targets collection '{found}' but repository holds '{expected}'")]
    CollectionMismatch { expected: String, found: String },
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound(_))
    }
}

/// Errors from the file storage collaborator.
///
/// Opaque to the repository core; surfaced to callers as-is and never retried.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Uploaded file has no name")]
    MissingFileName,
}

/// Convenience type alias for repository Results
pub type Result<T> = std::result::Result<T, RepoError>;
