//! In-memory repository.
//!
//! Records live in a `BTreeMap` keyed by id, so iterating the table yields
//! creation order for free. Destroyed records leave a tombstone behind: the
//! id stays reserved and every later operation on it reports `NotFound`.

use crate::error::{RepoError, Result};
use crate::pagination::{PagedResult, PaginationSpec};
use crate::traits::Repository;
use parking_lot::RwLock;
use records::{Query, Record, RecordId};
use std::collections::BTreeMap;
use tracing::debug;

/// Lifecycle state of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Active,
    /// Terminal; reached only through `destroy`
    Deleted,
}

enum Slot<R> {
    Active(R),
    Deleted,
}

struct Table<R> {
    last_id: RecordId,
    slots: BTreeMap<RecordId, Slot<R>>,
}

/// Repository backed by a lock-guarded map.
///
/// ## Concurrency
/// - Reads (`read`, `list`, `count`) share a read lock
/// - Writes take the write lock only for the mutation itself
/// - `list` clones the active rows and releases the lock before the
///   query runs, so slow queries never block writers
pub struct InMemoryRepository<R: Record> {
    table: RwLock<Table<R>>,
}

impl<R: Record> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table {
                last_id: 0,
                slots: BTreeMap::new(),
            }),
        }
    }

    /// Create a repository pre-populated from drafts, in order.
    ///
    /// Fails on the first draft that does not validate.
    pub fn seeded(drafts: impl IntoIterator<Item = R::Draft>) -> Result<Self> {
        let repo = Self::new();
        for draft in drafts {
            repo.create(draft)?;
        }
        debug!("Seeded {} with {} records", R::COLLECTION, repo.count());
        Ok(repo)
    }

    /// Lifecycle state of `id`, or `None` if it was never issued.
    pub fn state(&self, id: RecordId) -> Option<RecordState> {
        self.table.read().slots.get(&id).map(|slot| match slot {
            Slot::Active(_) => RecordState::Active,
            Slot::Deleted => RecordState::Deleted,
        })
    }

    fn snapshot(&self) -> Vec<R> {
        self.table
            .read()
            .slots
            .values()
            .filter_map(|slot| match slot {
                Slot::Active(record) => Some(record.clone()),
                Slot::Deleted => None,
            })
            .collect()
    }
}

impl<R: Record> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Repository<R> for InMemoryRepository<R> {
    fn list(&self, pagination: &PaginationSpec, query: Query) -> Result<PagedResult<R>> {
        if query.collection() != R::COLLECTION {
            return Err(RepoError::CollectionMismatch {
                expected: R::COLLECTION.to_string(),
                found: query.collection().to_string(),
            });
        }

        let rows = query.execute(self.snapshot());
        debug!(
            "Listed {}: {} matching rows ({} constraints)",
            R::COLLECTION,
            rows.len(),
            query.constraints().len()
        );
        Ok(pagination.paginate(rows))
    }

    fn create(&self, draft: R::Draft) -> Result<R> {
        let mut table = self.table.write();
        let id = table.last_id + 1;
        let record = R::from_draft(id, draft)?;

        table.last_id = id;
        table.slots.insert(id, Slot::Active(record.clone()));
        debug!("Created {} record {}", R::COLLECTION, id);
        Ok(record)
    }

    fn read(&self, id: RecordId) -> Result<R> {
        match self.table.read().slots.get(&id) {
            Some(Slot::Active(record)) => Ok(record.clone()),
            _ => Err(RepoError::NotFound(id)),
        }
    }

    fn update(&self, id: RecordId, patch: R::Patch) -> Result<R> {
        let mut table = self.table.write();
        match table.slots.get_mut(&id) {
            Some(Slot::Active(record)) => {
                record.apply_patch(patch)?;
                debug!("Updated {} record {}", R::COLLECTION, id);
                Ok(record.clone())
            }
            _ => Err(RepoError::NotFound(id)),
        }
    }

    fn destroy(&self, id: RecordId) -> Result<R> {
        let mut table = self.table.write();
        let slot = table.slots.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        match std::mem::replace(slot, Slot::Deleted) {
            Slot::Active(record) => {
                debug!("Destroyed {} record {}", R::COLLECTION, id);
                Ok(record)
            }
            Slot::Deleted => Err(RepoError::NotFound(id)),
        }
    }

    fn count(&self) -> usize {
        self.table
            .read()
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Active(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::{User, UserDraft, UserPatch};

    fn repo_with(n: usize) -> InMemoryRepository<User> {
        InMemoryRepository::seeded(
            (1..=n).map(|i| UserDraft::new(format!("User {i}"), format!("user{i}@example.com"))),
        )
        .unwrap()
    }

    #[test]
    fn test_ids_are_sequential() {
        let repo = repo_with(3);
        let ids: Vec<_> = repo
            .all(&PaginationSpec::none())
            .unwrap()
            .items()
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_failed_create_does_not_consume_id() {
        let repo = repo_with(1);
        assert!(repo.create(UserDraft::new("", "x@example.com")).is_err());

        let user = repo.create(UserDraft::new("Two", "two@example.com")).unwrap();
        assert_eq!(user.id, 2);
    }

    #[test]
    fn test_destroy_is_terminal() {
        let repo = repo_with(2);
        let removed = repo.destroy(1).unwrap();
        assert_eq!(removed.name, "User 1");
        assert_eq!(repo.state(1), Some(RecordState::Deleted));
        assert_eq!(repo.state(2), Some(RecordState::Active));
        assert_eq!(repo.state(3), None);

        assert!(repo.read(1).unwrap_err().is_not_found());
        assert!(repo.destroy(1).unwrap_err().is_not_found());
        assert!(repo
            .update(1, UserPatch { name: Some("Back".into()), ..Default::default() })
            .unwrap_err()
            .is_not_found());
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_destroy() {
        let repo = repo_with(2);
        repo.destroy(2).unwrap();
        let user = repo.create(UserDraft::new("Three", "three@example.com")).unwrap();
        assert_eq!(user.id, 3);
    }

    #[test]
    fn test_invalid_update_keeps_record() {
        let repo = repo_with(1);
        let err = repo
            .update(1, UserPatch { email: Some("nope".into()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(repo.read(1).unwrap().email, "user1@example.com");
    }

    #[test]
    fn test_collection_mismatch() {
        let repo = repo_with(1);
        let err = repo
            .list(&PaginationSpec::none(), Query::new("tokens"))
            .unwrap_err();
        assert!(matches!(err, RepoError::CollectionMismatch { .. }));
    }
}
