//! In-memory storage doubles for pipeline tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use medipipe_storage::{Storage, StorageBackend, StorageConnector, StorageError, StorageResult};

/// In-memory object store.
#[derive(Default)]
pub struct MockStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn upload_file(&self, key: &str, path: &Path) -> StorageResult<()> {
        let data = std::fs::read(path)?;
        self.insert(key, &data);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Connector handing out the same [`MockStorage`] and counting how many
/// clients were opened.
pub struct MockConnector {
    storage: Arc<MockStorage>,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new(storage: Arc<MockStorage>) -> Arc<Self> {
        Arc::new(Self {
            storage,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageConnector for MockConnector {
    async fn connect(&self) -> StorageResult<Arc<dyn Storage>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.storage) as Arc<dyn Storage>)
    }
}

/// Storage whose existence probe always fails; uploads go through to the
/// wrapped store.
pub struct FlakyProbeStorage {
    pub inner: Arc<MockStorage>,
}

#[async_trait]
impl Storage for FlakyProbeStorage {
    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Err(StorageError::ProbeFailed("probe unavailable".to_string()))
    }

    async fn upload_file(&self, key: &str, path: &Path) -> StorageResult<()> {
        self.inner.upload_file(key, path).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Connector over any storage, without connection counting.
pub struct StaticConnector {
    storage: Arc<dyn Storage>,
}

impl StaticConnector {
    pub fn new(storage: Arc<dyn Storage>) -> Arc<Self> {
        Arc::new(Self { storage })
    }
}

#[async_trait]
impl StorageConnector for StaticConnector {
    async fn connect(&self) -> StorageResult<Arc<dyn Storage>> {
        Ok(Arc::clone(&self.storage))
    }
}
