//! Controller error type.

use pipeline::PipelineError;
use repository::{RepoError, StorageError};
use thiserror::Error;

/// Everything a controller operation can fail with.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A request parameter was rejected before any data was touched
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Repository(#[from] RepoError),

    /// The file storage backend failed; surfaced as-is
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ControllerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ControllerError::Repository(err) if err.is_not_found())
    }

    /// HTTP status an API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ControllerError::Pipeline(PipelineError::MalformedRequest(_)) => 400,
            ControllerError::Pipeline(PipelineError::InvalidFilterValue { .. }) => 422,
            ControllerError::Pipeline(PipelineError::DuplicateFilterDefinition(_)) => 500,
            ControllerError::Repository(RepoError::NotFound(_)) => 404,
            ControllerError::Repository(RepoError::Validation(_)) => 422,
            ControllerError::Repository(RepoError::CollectionMismatch { .. }) => 500,
            ControllerError::Storage(StorageError::MissingFileName) => 422,
            ControllerError::Storage(_) => 500,
        }
    }
}

/// Convenience type alias for controller Results
pub type Result<T> = std::result::Result<T, ControllerError>;
