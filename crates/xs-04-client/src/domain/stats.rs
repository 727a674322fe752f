use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for a client
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Calls registered in the pending table
    pub registered: AtomicU64,
    /// Calls buffered until the handshake
    pub queued: AtomicU64,
    /// Calls resolved by a matching reply
    pub completed: AtomicU64,
    /// Calls that hit the request timeout
    pub timeouts: AtomicU64,
    /// Calls whose caller stopped waiting (timeouts included)
    pub abandoned: AtomicU64,
    /// Replies with no pending call
    pub unmatched: AtomicU64,
    /// Messages ignored because they did not come from the hub origin
    pub foreign: AtomicU64,
}

/// Point-in-time copy of [`ClientStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    pub registered: u64,
    pub queued: u64,
    pub completed: u64,
    pub timeouts: u64,
    pub abandoned: u64,
    pub unmatched: u64,
    pub foreign: u64,
}

impl ClientStats {
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            registered: self.registered.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            foreign: self.foreign.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
