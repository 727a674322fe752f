//! # TTL Store Service
//!
//! Wraps a [`StorageBackend`] with per-entry expiry. Every call reads the
//! clock once, so a batched read evaluates all keys against the same instant.

use crate::adapters::SystemTimeSource;
use crate::domain::{Entry, StoreError, Timestamp};
use crate::ports::{StorageBackend, TimeSource};
use shared_types::Value;
use tracing::{debug, warn};

/// Expiring key-value store.
pub struct TtlStore<B, T = SystemTimeSource> {
    backend: B,
    clock: T,
}

impl<B: StorageBackend> TtlStore<B, SystemTimeSource> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemTimeSource)
    }
}

impl<B: StorageBackend, T: TimeSource> TtlStore<B, T> {
    pub fn with_clock(backend: B, clock: T) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    /// Write `value` under `key`, replacing any previous entry.
    ///
    /// `ttl_millis > 0` sets an expiry; anything else stores it forever.
    pub async fn set(
        &self,
        key: &str,
        value: Value,
        ttl_millis: Option<i64>,
    ) -> Result<(), StoreError> {
        let entry = Entry::new(value, self.clock.now_millis(), ttl_millis);
        let document = entry.encode().map_err(|e| StoreError::CorruptEntry {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.backend.set(key, document).await?;
        debug!(key, expires_at = ?entry.expires_at, "Entry written");
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = self.clock.now_millis();
        self.read_live(key, now).await
    }

    /// One result per key, in input order.
    pub async fn get_many<K: AsRef<str>>(
        &self,
        keys: &[K],
    ) -> Result<Vec<Option<Value>>, StoreError> {
        let now = self.clock.now_millis();
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.read_live(key.as_ref(), now).await?);
        }
        Ok(values)
    }

    pub async fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<(), StoreError> {
        for key in keys {
            self.backend.delete(key.as_ref()).await?;
        }
        Ok(())
    }

    /// Keys holding a live entry, sorted.
    pub async fn get_all_keys(&self) -> Result<Vec<String>, StoreError> {
        let now = self.clock.now_millis();
        let mut live = Vec::new();
        for key in self.backend.keys().await? {
            if let Some(entry) = self.read_entry(&key).await? {
                if !entry.is_expired(now) {
                    live.push(key);
                }
            }
        }
        live.sort();
        Ok(live)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.backend.clear().await?;
        Ok(())
    }

    /// Delete every expired entry. Returns the number removed.
    ///
    /// Reads and deletes are separate backend calls. The caller must keep
    /// writers out for the duration, as `Hub::purge_expired` does.
    pub async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now_millis();
        let mut purged = 0;
        for key in self.backend.keys().await? {
            let expired = self
                .read_entry(&key)
                .await?
                .is_some_and(|entry| entry.is_expired(now));
            if expired {
                self.backend.delete(&key).await?;
                purged += 1;
            }
        }
        if purged > 0 {
            debug!(purged, "Expired entries purged");
        }
        Ok(purged)
    }

    async fn read_live(&self, key: &str, now: Timestamp) -> Result<Option<Value>, StoreError> {
        let Some(entry) = self.read_entry(key).await? else {
            return Ok(None);
        };
        if !entry.is_expired(now) {
            return Ok(Some(entry.value));
        }

        // Best effort; a failed purge leaves the entry to expire again.
        if let Err(e) = self.backend.delete(key).await {
            warn!(key, error = %e, "Failed to purge expired entry");
        } else {
            debug!(key, "Expired entry purged on read");
        }
        Ok(None)
    }

    async fn read_entry(&self, key: &str) -> Result<Option<Entry>, StoreError> {
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        Entry::decode(&raw)
            .map(Some)
            .map_err(|e| StoreError::CorruptEntry {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }
}
