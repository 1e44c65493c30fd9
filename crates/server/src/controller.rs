//! # User Controller
//!
//! Coordinates the pieces behind the user endpoints:
//! 1. Read filter and page parameters from the request
//! 2. Run the filter pipeline over an unfiltered users query
//! 3. Hand the composed query to the repository
//! 4. Shape the rows into a length-aware page
//!
//! Single-record operations (store, read, update, destroy) go straight to
//! the repository; profile picture uploads also go through file storage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use pipeline::{FilterPipeline, RequestParams};
use records::{RecordId, User, UserDraft, UserPatch};
use repository::{
    CloudFileService, DEFAULT_PER_PAGE, InMemoryRepository, LocalFileService, PagedResult,
    PaginationSpec, Repository, UploadedFile,
};

use crate::error::Result;
use crate::users::users_pipeline;

/// Storage directory profile pictures are uploaded under
pub const PROFILE_PICTURE_DIR: &str = "images";
pub const PROFILE_PICTURE_SUBDIR: &str = "profile-pictures";

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Page size used when a listing request names none
    pub per_page: usize,
    /// Directory local uploads are written to
    pub storage_root: PathBuf,
    /// Public URL prefix for stored files
    pub base_url: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            storage_root: PathBuf::from("storage/app"),
            base_url: "http://localhost/storage".to_string(),
        }
    }
}

/// Result of a profile picture upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePicture {
    pub user_id: RecordId,
    pub path: String,
    pub url: String,
}

/// Entry point for user operations.
///
/// Cheap to clone: every collaborator sits behind an `Arc`.
#[derive(Clone)]
pub struct UserController {
    repository: Arc<dyn Repository<User>>,
    pipeline: Arc<FilterPipeline>,
    storage: Arc<dyn CloudFileService>,
    config: ControllerConfig,
    /// Serializes profile picture replacement across clones
    upload_lock: Arc<Mutex<()>>,
}

impl UserController {
    /// Create a controller over the given repository and storage, using the
    /// standard users pipeline.
    pub fn new(
        repository: Arc<dyn Repository<User>>,
        storage: Arc<dyn CloudFileService>,
        config: ControllerConfig,
    ) -> Result<Self> {
        Ok(Self {
            repository,
            pipeline: Arc::new(users_pipeline()?),
            storage,
            config,
            upload_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Controller backed by an in-memory repository seeded with `seed`, and
    /// local file storage under `config.storage_root`.
    pub fn in_memory(
        config: ControllerConfig,
        seed: impl IntoIterator<Item = UserDraft>,
    ) -> Result<Self> {
        let repository = Arc::new(InMemoryRepository::<User>::seeded(seed)?);
        let storage = Arc::new(LocalFileService::new(
            config.storage_root.clone(),
            config.base_url.clone(),
        ));
        info!(
            "Initialized user controller with {} seeded users (storage at {})",
            repository.count(),
            config.storage_root.display()
        );
        Self::new(repository, storage, config)
    }

    /// Length-aware pagination from the `page` and `per_page` parameters.
    ///
    /// A missing or zero `per_page` falls back to the configured page size.
    pub fn pagination_for(&self, request: &RequestParams) -> Result<PaginationSpec> {
        let page = request.parse::<usize>("page")?.unwrap_or(1);
        let per_page = request
            .parse::<usize>("per_page")?
            .filter(|&n| n > 0)
            .unwrap_or(self.config.per_page);
        Ok(PaginationSpec::length_aware(Some(per_page)).with_page(page))
    }

    /// List users matching the request's filters, one page at a time.
    pub fn index(&self, request: &RequestParams) -> Result<PagedResult<User>> {
        let start_time = Instant::now();

        let pagination = self.pagination_for(request)?;
        let query = self
            .pipeline
            .run(request, self.repository.query())
            .inspect_err(|err| warn!("Rejected user listing: {}", err))?;
        let page = self.repository.list(&pagination, query)?;

        info!(
            "Listed {} users (page {}, total {:?}) in {:.2?}",
            page.len(),
            pagination.current_page(),
            page.total(),
            start_time.elapsed()
        );
        Ok(page)
    }

    pub fn store(&self, draft: UserDraft) -> Result<User> {
        let user = self.repository.create(draft)?;
        info!("Created user {}", user.id);
        Ok(user)
    }

    pub fn read(&self, id: RecordId) -> Result<User> {
        Ok(self.repository.read(id)?)
    }

    pub fn update(&self, id: RecordId, patch: UserPatch) -> Result<User> {
        let user = self.repository.update(id, patch)?;
        info!("Updated user {}", id);
        Ok(user)
    }

    pub fn destroy(&self, id: RecordId) -> Result<User> {
        let user = self.repository.destroy(id)?;
        info!("Deleted user {}", id);
        Ok(user)
    }

    /// Store a new profile picture and point the user at it.
    ///
    /// The user must exist before anything is written. A previous picture is
    /// removed only after the user record references the new one.
    ///
    /// Uploads run one at a time from reading the current picture until the
    /// record points at the new one, so concurrent uploads for a user never
    /// both replace the same old file.
    pub async fn upload_profile_picture(
        &self,
        id: RecordId,
        file: UploadedFile,
    ) -> Result<ProfilePicture> {
        let guard = self.upload_lock.lock().await;
        let previous = self.repository.read(id)?.profile_picture_path;

        let stored = self
            .storage
            .upload(
                id,
                file,
                Some(PROFILE_PICTURE_DIR),
                Some(PROFILE_PICTURE_SUBDIR),
            )
            .await?;

        let patch = UserPatch {
            profile_picture_path: Some(stored.path.clone()),
            ..Default::default()
        };
        if let Err(err) = self.repository.update(id, patch) {
            // The user vanished mid-upload; don't leave an orphaned file
            if let Err(cleanup) = self.storage.delete(&stored.path).await {
                warn!("Failed to remove orphaned upload {}: {}", stored.path, cleanup);
            }
            return Err(err.into());
        }
        drop(guard);

        if let Some(old_path) = previous.filter(|old| *old != stored.path) {
            match self.storage.delete(&old_path).await {
                Ok(_) => info!("Replaced profile picture {} for user {}", old_path, id),
                Err(err) => warn!("Failed to delete old profile picture {}: {}", old_path, err),
            }
        }

        info!("Uploaded profile picture for user {} to {}", id, stored.path);
        Ok(ProfilePicture {
            user_id: stored.owner_id,
            path: stored.path,
            url: stored.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use pipeline::PipelineError;

    fn controller(n: u32) -> UserController {
        let seed = (1..=n).map(|i| {
            UserDraft::new(format!("User {i}"), format!("user{i}@example.com")).with_age(20 + i)
        });
        UserController::in_memory(ControllerConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_pagination_defaults() {
        let controller = controller(0);
        let spec = controller.pagination_for(&RequestParams::new()).unwrap();
        assert_eq!(spec.current_page(), 1);
        assert_eq!(spec.page_size(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_pagination_from_request() {
        let controller = controller(0);
        let request = RequestParams::from_query_string("page=3&per_page=5");
        let spec = controller.pagination_for(&request).unwrap();
        assert_eq!(spec.current_page(), 3);
        assert_eq!(spec.page_size(), 5);
    }

    #[test]
    fn test_zero_per_page_uses_configured_size() {
        let config = ControllerConfig {
            per_page: 5,
            ..Default::default()
        };
        let seed =
            (1..=30).map(|i| UserDraft::new(format!("User {i}"), format!("u{i}@example.com")));
        let controller = UserController::in_memory(config, seed).unwrap();

        let absent = controller.index(&RequestParams::new()).unwrap();
        assert_eq!(absent.len(), 5);

        let zero = controller
            .index(&RequestParams::new().with("per_page", "0"))
            .unwrap();
        assert_eq!(zero.len(), 5);
        assert!(matches!(zero, PagedResult::LengthAware { per_page: 5, last_page: 6, .. }));
    }

    #[test]
    fn test_bad_page_rejected() {
        let controller = controller(3);
        let err = controller
            .index(&RequestParams::new().with("page", "two"))
            .unwrap_err();
        match &err {
            ControllerError::Pipeline(PipelineError::InvalidFilterValue { key, .. }) => {
                assert_eq!(key, "page");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_index_is_length_aware() {
        let controller = controller(20);
        let page = controller
            .index(&RequestParams::from_query_string("per_page=5&page=4"))
            .unwrap();
        match page {
            PagedResult::LengthAware {
                items,
                total,
                last_page,
                ..
            } => {
                assert_eq!(items.first().map(|u| u.id), Some(16));
                assert_eq!(total, 20);
                assert_eq!(last_page, 4);
            }
            other => panic!("expected a length-aware page, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let controller = controller(1);
        let err = controller.read(9).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_invalid_store_is_unprocessable() {
        let controller = controller(0);
        let err = controller
            .store(UserDraft::new("Nobody", "not-an-email"))
            .unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), 422);
    }
}
