//! Backend construction from configuration.

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageConnector, StorageResult};

/// Which backend to talk to, with its connection parameters.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    S3 {
        bucket: String,
        region: String,
        /// Custom endpoint for S3-compatible providers (MinIO etc.).
        endpoint: Option<String>,
    },
    Local {
        base_path: std::path::PathBuf,
    },
}

/// Create a storage client based on configuration.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config {
        #[cfg(feature = "storage-s3")]
        StorageConfig::S3 {
            bucket,
            region,
            endpoint,
        } => {
            let storage = S3Storage::new(bucket.clone(), region.clone(), endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageConfig::S3 { .. } => Err(crate::StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageConfig::Local { base_path } => {
            let storage = LocalStorage::new(base_path.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageConfig::Local { .. } => Err(crate::StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// A `StorageConfig` is itself a connector: connecting builds a fresh client,
/// which is how the upload worker renews its connection.
#[async_trait]
impl StorageConnector for StorageConfig {
    async fn connect(&self) -> StorageResult<Arc<dyn Storage>> {
        create_storage(self).await
    }
}
