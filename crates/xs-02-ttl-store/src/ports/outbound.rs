//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the TTL store requires from its host.

use crate::domain::Timestamp;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend I/O error on key {key}: {message}")]
    Io { key: String, message: String },
}

/// Abstract interface for the persistent key-value backend.
///
/// Values are opaque documents; the store owns their encoding.
///
/// Production: any durable map exposing these four calls.
/// Testing: `InMemoryBackend`, `FailingBackend`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    async fn set(&self, key: &str, document: String) -> Result<(), BackendError>;

    /// Remove a key. Absent keys succeed.
    async fn delete(&self, key: &str) -> Result<(), BackendError>;

    async fn keys(&self) -> Result<Vec<String>, BackendError>;

    /// Remove every key.
    async fn clear(&self) -> Result<(), BackendError> {
        for key in self.keys().await? {
            self.delete(&key).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, document: String) -> Result<(), BackendError> {
        (**self).set(key, document).await
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        (**self).delete(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        (**self).keys().await
    }

    async fn clear(&self) -> Result<(), BackendError> {
        (**self).clear().await
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds since epoch.
    fn now_millis(&self) -> Timestamp;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_millis(&self) -> Timestamp {
        (**self).now_millis()
    }
}
