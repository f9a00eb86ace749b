//! Storage abstraction traits.
//!
//! [`Storage`] is the surface the upload worker consumes; [`StorageConnector`]
//! is how it obtains (and periodically recreates) a client.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Existence probe failed: {0}")]
    ProbeFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Remote object storage as seen by the upload stage.
///
/// `exists` is the HeadObject-equivalent idempotency probe; "not found" is a
/// normal `Ok(false)`, not an error. `upload_file` is the PutObject-equivalent
/// whole-file transfer.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Upload the local file at `path` to `key`.
    async fn upload_file(&self, key: &str, path: &Path) -> StorageResult<()>;

    /// The backend type behind this client.
    fn backend_type(&self) -> StorageBackend;
}

/// Factory for storage clients.
///
/// The upload worker connects once at startup and reconnects after a fixed
/// number of handled items, discarding the previous client.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    async fn connect(&self) -> StorageResult<Arc<dyn Storage>>;
}
