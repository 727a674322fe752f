use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for a hub
#[derive(Debug, Default)]
pub struct HubStats {
    /// Messages received while listening
    pub received: AtomicU64,
    /// Replies handed to the transport
    pub replied: AtomicU64,
    /// Messages dropped without a reply
    pub dropped: AtomicU64,
    /// Requests rejected by the permission gate
    pub denied: AtomicU64,
    /// Requests answered with a protocol error
    pub protocol_errors: AtomicU64,
    /// Requests answered with a storage failure
    pub storage_failures: AtomicU64,
}

/// Point-in-time copy of [`HubStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStatsSnapshot {
    pub received: u64,
    pub replied: u64,
    pub dropped: u64,
    pub denied: u64,
    pub protocol_errors: u64,
    pub storage_failures: u64,
}

impl HubStats {
    pub fn snapshot(&self) -> HubStatsSnapshot {
        HubStatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            replied: self.replied.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
