//! # Repository Crate
//!
//! Persistence contract for records, with pagination, plus the file storage
//! collaborator that sits next to it.
//!
//! ## Components
//!
//! ### Repository
//! Generic CRUD + listing over one collection:
//! - `list` executes a query built by a `FilterPipeline`
//! - `all` lists without filters
//! - `create`, `read`, `update`, `destroy` act on single records
//!
//! ### Pagination
//! `PaginationSpec` picks one of three result shapes (`None`, `Simple`,
//! `LengthAware`); `PagedResult` carries the page and its metadata.
//!
//! ### Storage
//! `CloudFileService` uploads and deletes files for record owners;
//! `LocalFileService` is the filesystem implementation.
//!
//! ## Example Usage
//!
//! ```ignore
//! use repository::{InMemoryRepository, PaginationSpec, Repository};
//! use records::{User, UserDraft};
//!
//! let users = InMemoryRepository::<User>::new();
//! let ann = users.create(UserDraft::new("Ann", "ann@example.com"))?;
//!
//! let query = pipeline.run(&request, users.query())?;
//! let page = users.list(&PaginationSpec::length_aware(Some(10)).with_page(2), query)?;
//! ```

// Public modules
pub mod error;
pub mod memory;
pub mod pagination;
pub mod storage;
pub mod traits;

// Re-export commonly used types
pub use error::{RepoError, Result, StorageError};
pub use memory::{InMemoryRepository, RecordState};
pub use pagination::{DEFAULT_PER_PAGE, PagedResult, PaginationMode, PaginationSpec};
pub use storage::{CloudFileService, LocalFileService, StoredFile, UploadedFile};
pub use traits::Repository;
