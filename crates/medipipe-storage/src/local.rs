use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// Local filesystem storage implementation, for development and tests.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`, creating the
    /// directory if absent.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that could
    /// escape the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::ProbeFailed(e.to_string())),
        }
    }

    async fn upload_file(&self, key: &str, path: &Path) -> StorageResult<()> {
        let dest = self.key_to_path(key)?;
        Self::ensure_parent_dir(&dest).await?;

        fs::copy(path, &dest).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                dest.display(),
                e
            ))
        })?;

        tracing::debug!(key = %key, path = %path.display(), "Local upload successful");
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_exists() {
        let store_dir = tempfile::tempdir().unwrap();
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("clip.mp4");
        tokio::fs::write(&src, b"video data").await.unwrap();

        let storage = LocalStorage::new(store_dir.path()).await.unwrap();
        let key = "folder/2020-11-15/clip.mp4";

        assert!(!storage.exists(key).await.unwrap());
        storage.upload_file(key, &src).await.unwrap();
        assert!(storage.exists(key).await.unwrap());

        let stored = tokio::fs::read(store_dir.path().join(key)).await.unwrap();
        assert_eq!(stored, b"video data");
    }

    #[tokio::test]
    async fn traversal_keys_rejected() {
        let store_dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(store_dir.path()).await.unwrap();

        let err = storage.exists("../outside").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn missing_source_file_fails_upload() {
        let store_dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(store_dir.path()).await.unwrap();

        let err = storage
            .upload_file("folder/missing.mp4", Path::new("/nonexistent/missing.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));
    }
}
