//! Remote object storage for the medipipe upload stage.
//!
//! The upload stage needs exactly two operations against remote storage: an
//! existence probe (the idempotency check) and a whole-file upload. The
//! [`Storage`] trait captures that surface; [`S3Storage`] and
//! [`LocalStorage`] implement it behind the `storage-s3` and `storage-local`
//! features. [`StorageConnector`] lets the upload worker recreate its client
//! periodically without knowing which backend it talks to.
//!
//! **Key format:** `<folder>/<date>/<file name>`, produced by
//! [`ObjectPrefix`].

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

pub use factory::{create_storage, StorageConfig};
pub use keys::ObjectPrefix;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageConnector, StorageError, StorageResult};

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}
