//! File storage collaborator.
//!
//! Exposed alongside the repository for endpoints that attach files to
//! records (profile pictures). The repository core never calls it.

use crate::error::StorageError;
use async_trait::async_trait;
use records::RecordId;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// A file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension of the client file name, if it has a usable one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub owner_id: RecordId,
    /// Storage-relative path, `/`-separated
    pub path: String,
    /// Public URL for the stored file
    pub url: String,
}

/// File storage backend trait.
#[async_trait]
pub trait CloudFileService: Send + Sync {
    /// Store `file` for `owner_id` under `parent_dir/child_dir`.
    async fn upload(
        &self,
        owner_id: RecordId,
        file: UploadedFile,
        parent_dir: Option<&str>,
        child_dir: Option<&str>,
    ) -> Result<StoredFile, StorageError>;

    /// Delete a stored file.
    ///
    /// Returns `false` when there was nothing at `path`.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

/// Local filesystem storage.
pub struct LocalFileService {
    /// Directory all stored paths are relative to
    root: PathBuf,
    /// Base URL for public file access
    base_url: String,
}

impl LocalFileService {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Resolve a storage-relative path below the root.
    ///
    /// Rejects absolute paths and `..` components to prevent directory traversal.
    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let relative_path = Path::new(relative);
        if relative.is_empty()
            || !relative_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(relative_path))
    }
}

#[async_trait]
impl CloudFileService for LocalFileService {
    async fn upload(
        &self,
        owner_id: RecordId,
        file: UploadedFile,
        parent_dir: Option<&str>,
        child_dir: Option<&str>,
    ) -> Result<StoredFile, StorageError> {
        if file.file_name.trim().is_empty() {
            return Err(StorageError::MissingFileName);
        }

        let stored_name = match file.extension() {
            Some(ext) => format!("{owner_id}-{}.{ext}", Uuid::new_v4()),
            None => format!("{owner_id}-{}", Uuid::new_v4()),
        };
        let path = [parent_dir, child_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.trim_matches('/'))
            .filter(|dir| !dir.is_empty())
            .chain(std::iter::once(stored_name.as_str()))
            .collect::<Vec<_>>()
            .join("/");

        let target = self.resolve(&path)?;
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(&target, &file.bytes).await?;
        debug!("Stored {} bytes for owner {} at {}", file.bytes.len(), owner_id, path);

        Ok(StoredFile {
            owner_id,
            url: self.url_for(&path),
            path,
        })
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {
                debug!("Deleted stored file {}", path);
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Stored file {} was already gone", path);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(UploadedFile::new("me.PNG", vec![]).extension().as_deref(), Some("png"));
        assert_eq!(UploadedFile::new("me", vec![]).extension(), None);
        assert_eq!(UploadedFile::new("me.p?g", vec![]).extension(), None);
    }

    #[tokio::test]
    async fn test_upload_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileService::new(dir.path(), "https://cdn.example.com/");

        let stored = storage
            .upload(
                7,
                UploadedFile::new("face.jpg", b"jpeg".to_vec()),
                Some("images"),
                Some("profile-pictures"),
            )
            .await
            .unwrap();

        assert_eq!(stored.owner_id, 7);
        assert!(stored.path.starts_with("images/profile-pictures/7-"));
        assert!(stored.path.ends_with(".jpg"));
        assert_eq!(stored.url, format!("https://cdn.example.com/{}", stored.path));
        assert_eq!(std::fs::read(dir.path().join(&stored.path)).unwrap(), b"jpeg");

        assert!(storage.delete(&stored.path).await.unwrap());
        assert!(!storage.delete(&stored.path).await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_without_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileService::new(dir.path(), "http://localhost/storage");

        let stored = storage
            .upload(1, UploadedFile::new("notes", b"x".to_vec()), None, None)
            .await
            .unwrap();
        assert!(!stored.path.contains('/'));
        assert!(stored.path.starts_with("1-"));
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileService::new(dir.path(), "http://localhost/storage");

        let err = storage.delete("../outside.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));

        let err = storage
            .upload(1, UploadedFile::new("a.txt", b"x".to_vec()), Some("../up"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_missing_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileService::new(dir.path(), "http://localhost/storage");

        let err = storage
            .upload(1, UploadedFile::new("  ", b"x".to_vec()), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingFileName));
    }
}
