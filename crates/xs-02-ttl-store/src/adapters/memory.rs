use crate::ports::{BackendError, StorageBackend};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory storage backend.
///
/// Safe to share across tasks; every call completes without suspending.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<HashMap<String, String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Raw stored document, bypassing expiry.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.read().get(key).cloned()
    }

    /// Write a raw document, bypassing encoding.
    pub fn insert_raw(&self, key: impl Into<String>, document: impl Into<String>) {
        self.data.write().insert(key.into(), document.into());
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn set(&self, key: &str, document: String) -> Result<(), BackendError> {
        self.data.write().insert(key.to_string(), document);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.data.read().keys().cloned().collect())
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.data.write().clear();
        Ok(())
    }
}
