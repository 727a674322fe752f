//! Backend doubles for exercising failure paths and interleavings.

use crate::adapters::InMemoryBackend;
use crate::ports::{BackendError, StorageBackend};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// In-memory backend whose reads and writes can be made to fail on demand.
///
/// Clones share state, so a test can keep one handle while the store owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct FailingBackend {
    inner: Arc<InMemoryBackend>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.fail_reads.store(false, Ordering::SeqCst);
        self.fail_writes.store(false, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryBackend {
        &self.inner
    }

    fn check_read(&self, key: &str) -> Result<(), BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Io {
                key: key.to_string(),
                message: "injected read failure".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, key: &str) -> Result<(), BackendError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Io {
                key: key.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.check_read(key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, document: String) -> Result<(), BackendError> {
        self.check_write(key)?;
        self.inner.set(key, document).await
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.check_write(key)?;
        self.inner.delete(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("injected failure".to_string()));
        }
        self.inner.keys().await
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.check_write("*")?;
        self.inner.clear().await
    }
}

/// In-memory backend that can suspend one read mid-flight, so a test can
/// interleave other work with an operation that is halfway done.
#[derive(Debug, Clone, Default)]
pub struct GatedBackend {
    inner: Arc<InMemoryBackend>,
    gate: Arc<Gate>,
}

#[derive(Debug, Default)]
struct Gate {
    key: Mutex<Option<String>>,
    entered: Notify,
    release: Notify,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend the next `get` of `key` until [`GatedBackend::release`].
    pub fn hold_next_read(&self, key: &str) {
        *self.gate.key.lock() = Some(key.to_string());
    }

    /// Resolves once a read is suspended.
    pub async fn held(&self) {
        self.gate.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl StorageBackend for GatedBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let hold = {
            let mut held = self.gate.key.lock();
            if held.as_deref() == Some(key) {
                *held = None;
                true
            } else {
                false
            }
        };
        if hold {
            self.gate.entered.notify_one();
            self.gate.release.notified().await;
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, document: String) -> Result<(), BackendError> {
        self.inner.set(key, document).await
    }

    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.inner.delete(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, BackendError> {
        self.inner.keys().await
    }
}
