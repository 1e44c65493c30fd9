//! Repository contract.

use crate::error::Result;
use crate::pagination::{PagedResult, PaginationSpec};
use records::{Query, Record, RecordId};

/// Persistence contract for one collection of `R` records.
///
/// Methods take `&self`: implementations own their synchronization so a
/// repository can be shared behind an `Arc`.
pub trait Repository<R: Record>: Send + Sync {
    /// Unfiltered query over this repository's collection.
    ///
    /// The starting point handed to a `FilterPipeline`.
    fn query(&self) -> Query {
        Query::for_record::<R>()
    }

    /// List every active record.
    fn all(&self, pagination: &PaginationSpec) -> Result<PagedResult<R>> {
        self.list(pagination, self.query())
    }

    /// Execute an already filtered query and shape the result.
    ///
    /// Rows come back in ascending creation order unless the query orders
    /// them otherwise.
    fn list(&self, pagination: &PaginationSpec, query: Query) -> Result<PagedResult<R>>;

    /// Validate and persist a new record with a generated id.
    fn create(&self, draft: R::Draft) -> Result<R>;

    /// Fetch one active record, or `NotFound`.
    fn read(&self, id: RecordId) -> Result<R>;

    /// Apply the supplied fields of `patch`, or `NotFound`.
    fn update(&self, id: RecordId, patch: R::Patch) -> Result<R>;

    /// Remove a record, returning it as it was just before removal.
    ///
    /// Terminal: later operations on `id` yield `NotFound`.
    fn destroy(&self, id: RecordId) -> Result<R>;

    /// Number of active records.
    fn count(&self) -> usize;
}
