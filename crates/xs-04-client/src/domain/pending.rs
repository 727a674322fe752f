//! Pending request table.
//!
//! Maps correlation ids to the continuation of the call waiting for them.
//!
//! Flow:
//! 1. `call()` builds a request and calls `register()` to get a receiver
//! 2. The request is sent (or buffered until the handshake)
//! 3. The receive task calls `complete()` when a reply with that id arrives
//! 4. `call()` awaits the receiver, or discards the entry when it gives up

use crate::domain::ClientStats;
use crate::error::ClientError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{CorrelationId, Operation, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::debug;

/// Final outcome delivered to a waiting call.
pub(crate) type CallResult = Result<Value, ClientError>;

struct PendingRequest {
    sender: oneshot::Sender<CallResult>,
    operation: Operation,
    created_at: Instant,
}

pub(crate) struct PendingRequests {
    pending: DashMap<CorrelationId, PendingRequest>,
    stats: Arc<ClientStats>,
}

impl PendingRequests {
    pub fn new(stats: Arc<ClientStats>) -> Self {
        Self {
            pending: DashMap::new(),
            stats,
        }
    }

    /// Register a call. At most one entry exists per id.
    pub fn register(
        &self,
        id: &CorrelationId,
        operation: Operation,
    ) -> Result<oneshot::Receiver<CallResult>, ClientError> {
        let (sender, receiver) = oneshot::channel();
        match self.pending.entry(id.clone()) {
            Entry::Occupied(_) => return Err(ClientError::DuplicateId(id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(PendingRequest {
                    sender,
                    operation,
                    created_at: Instant::now(),
                });
            }
        }
        ClientStats::bump(&self.stats.registered);
        Ok(receiver)
    }

    /// Resolve the call waiting on `id`.
    ///
    /// Returns false when no call is waiting, e.g. for a duplicated reply or
    /// one that arrives after its caller gave up.
    pub fn complete(&self, id: &CorrelationId, result: CallResult) -> bool {
        let Some((_, request)) = self.pending.remove(id) else {
            ClientStats::bump(&self.stats.unmatched);
            debug!(correlation_id = %id, "Reply for unknown correlation id discarded");
            return false;
        };

        let elapsed = request.created_at.elapsed();
        if request.sender.send(result).is_err() {
            // Caller future dropped between removal and delivery.
            ClientStats::bump(&self.stats.abandoned);
            return false;
        }

        ClientStats::bump(&self.stats.completed);
        debug!(
            correlation_id = %id,
            operation = %request.operation,
            response_time_ms = elapsed.as_millis(),
            "Completed pending request"
        );
        true
    }

    /// Drop the entry for a call whose caller stopped waiting.
    pub fn abandon(&self, id: &CorrelationId) -> bool {
        if self.pending.remove(id).is_some() {
            ClientStats::bump(&self.stats.abandoned);
            true
        } else {
            false
        }
    }

    /// Resolve every outstanding call with `error`.
    pub fn fail_all(&self, error: &ClientError) -> usize {
        let ids: Vec<CorrelationId> = self.pending.iter().map(|entry| entry.key().clone()).collect();
        let mut failed = 0;
        for id in ids {
            if let Some((_, request)) = self.pending.remove(&id) {
                let _ = request.sender.send(Err(error.clone()));
                failed += 1;
            }
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
