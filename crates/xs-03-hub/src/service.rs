//! # Hub Service
//!
//! Owns the permission matcher and the TTL store, and turns raw channel
//! messages into correlated replies.
//!
//! ## Reply Guarantee
//!
//! Every request whose correlation id can be recovered receives exactly one
//! reply per delivery. Store failures are converted into a
//! `storageFailure` reply and never escape the handler.

use crate::config::{DispatchMode, HubConfig};
use crate::domain::{Command, HubError, HubState, HubStats, HubStatsSnapshot, LockScope};
use crate::locks::KeyLocks;
use parking_lot::Mutex;
use shared_bus::{Channel, Inbox};
use shared_types::{
    CorrelationId, HandshakeMessage, Origin, RequestEnvelope, ResponseEnvelope, Value, WireError,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use xs_01_permission_matcher::PermissionMatcher;
use xs_02_ttl_store::{StorageBackend, StoreError, SystemTimeSource, TimeSource, TtlStore};

/// Outcome of the synchronous checks on an inbound message.
enum Admission {
    /// No correlation id; nothing can be answered.
    Drop,
    /// Answered without touching the store.
    Reply(ResponseEnvelope),
    /// Authorized and decoded.
    Execute { id: CorrelationId, command: Command },
}

/// Trusted-side storage hub.
pub struct Hub<B, T = SystemTimeSource> {
    matcher: PermissionMatcher,
    store: TtlStore<B, T>,
    dispatch: DispatchMode,
    state: Mutex<HubState>,
    stats: HubStats,
    locks: KeyLocks,
}

impl<B, T> Hub<B, T>
where
    B: StorageBackend + 'static,
    T: TimeSource + 'static,
{
    pub fn new(config: HubConfig, store: TtlStore<B, T>) -> Self {
        Self {
            matcher: config.matcher(),
            store,
            dispatch: config.dispatch,
            state: Mutex::new(HubState::Uninitialized),
            stats: HubStats::default(),
            locks: KeyLocks::new(),
        }
    }

    pub fn state(&self) -> HubState {
        *self.state.lock()
    }

    pub fn is_listening(&self) -> bool {
        self.state() == HubState::Listening
    }

    pub fn matcher(&self) -> &PermissionMatcher {
        &self.matcher
    }

    pub fn store(&self) -> &TtlStore<B, T> {
        &self.store
    }

    pub fn stats(&self) -> HubStatsSnapshot {
        self.stats.snapshot()
    }

    /// Announce readiness to the embedding context and start accepting
    /// requests.
    ///
    /// The handshake is sent exactly once. If it cannot be handed to the
    /// transport the hub stays `Uninitialized`.
    pub fn listen<C: Channel + ?Sized>(
        &self,
        channel: &C,
        embedder: &Origin,
    ) -> Result<(), HubError> {
        let mut state = self.state.lock();
        if *state == HubState::Listening {
            return Err(HubError::AlreadyListening);
        }

        channel.send(embedder, HandshakeMessage::READY.to_json())?;
        *state = HubState::Listening;

        info!(
            hub = %channel.local_origin(),
            embedder = %embedder,
            rules = self.matcher.rules().len(),
            "Hub listening"
        );
        Ok(())
    }

    /// Handle one inbound message.
    ///
    /// `sender` must be the origin stamped by the transport. Returns the
    /// reply to send back, or `None` when the message is dropped.
    pub async fn on_message(&self, raw: &str, sender: &Origin) -> Option<ResponseEnvelope> {
        match self.admit(raw, sender) {
            Admission::Drop => None,
            Admission::Reply(response) => Some(response),
            Admission::Execute { id, command } => {
                let _guard = self.locks.acquire(&command.lock_scope()).await;
                Some(self.execute(id, command).await)
            }
        }
    }

    /// Delete expired entries while holding the whole store, so a write
    /// admitted during the sweep is applied after it and survives.
    pub async fn purge_expired(&self) -> Result<usize, StoreError> {
        let _guard = self.locks.acquire(&LockScope::Store).await;
        self.store.purge_expired().await
    }

    /// Listen, then serve `inbox` on a background task.
    pub fn start<C: Channel>(
        self: Arc<Self>,
        channel: C,
        inbox: Inbox,
        embedder: &Origin,
    ) -> Result<JoinHandle<Result<(), HubError>>, HubError> {
        self.listen(&channel, embedder)?;
        Ok(tokio::spawn(self.run(channel, inbox)))
    }

    /// Serve deliveries until the transport goes away.
    pub async fn run<C: Channel>(self: Arc<Self>, channel: C, mut inbox: Inbox) -> Result<(), HubError> {
        if !self.is_listening() {
            return Err(HubError::NotListening);
        }
        let channel = Arc::new(channel);

        match self.dispatch {
            DispatchMode::Sequential => {
                while let Some(delivery) = inbox.recv().await {
                    if let Some(response) = self.on_message(&delivery.message, &delivery.sender).await {
                        self.reply(&*channel, &delivery.sender, &response);
                    }
                }
            }
            DispatchMode::Concurrent { max_in_flight } => {
                let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
                while let Some(delivery) = inbox.recv().await {
                    let (id, command) = match self.admit(&delivery.message, &delivery.sender) {
                        Admission::Drop => continue,
                        Admission::Reply(response) => {
                            self.reply(&*channel, &delivery.sender, &response);
                            continue;
                        }
                        Admission::Execute { id, command } => (id, command),
                    };

                    let Ok(permit) = permits.clone().acquire_owned().await else {
                        break;
                    };
                    // Reserved here, in arrival order, so same-key commands
                    // execute in the order they were received.
                    let reservation = self.locks.reserve(&command.lock_scope());

                    let hub = Arc::clone(&self);
                    let channel = Arc::clone(&channel);
                    tokio::spawn(async move {
                        let guard = reservation.ready().await;
                        let response = hub.execute(id, command).await;
                        drop(guard);
                        drop(permit);
                        hub.reply(&*channel, &delivery.sender, &response);
                    });
                }
            }
        }

        info!(hub = %channel.local_origin(), "Transport closed, hub stopped");
        Ok(())
    }

    fn admit(&self, raw: &str, sender: &Origin) -> Admission {
        if !self.is_listening() {
            HubStats::bump(&self.stats.dropped);
            debug!(origin = %sender, "Message before listen dropped");
            return Admission::Drop;
        }
        HubStats::bump(&self.stats.received);

        let request = match RequestEnvelope::parse(raw) {
            Ok(request) => request,
            Err(e) => {
                let Some(id) = e.correlation_id() else {
                    HubStats::bump(&self.stats.dropped);
                    debug!(origin = %sender, error = %e, "Unidentifiable message dropped");
                    return Admission::Drop;
                };
                HubStats::bump(&self.stats.protocol_errors);
                warn!(correlation_id = %id, origin = %sender, error = %e, "Malformed request");
                return Admission::Reply(ResponseEnvelope::err(
                    id.clone(),
                    WireError::protocol(e.to_string()),
                ));
            }
        };

        let RequestEnvelope { id, operation, args } = request;

        if !self.matcher.is_allowed(sender, operation) {
            HubStats::bump(&self.stats.denied);
            warn!(
                correlation_id = %id,
                origin = %sender,
                operation = %operation,
                "Permission denied"
            );
            return Admission::Reply(ResponseEnvelope::err(
                id,
                WireError::permission_denied(format!(
                    "origin {sender} may not perform {operation}"
                )),
            ));
        }

        match Command::decode(operation, args) {
            Ok(command) => {
                debug!(correlation_id = %id, origin = %sender, operation = %operation, "Request admitted");
                Admission::Execute { id, command }
            }
            Err(reason) => {
                HubStats::bump(&self.stats.protocol_errors);
                warn!(correlation_id = %id, origin = %sender, reason = %reason, "Invalid arguments");
                Admission::Reply(ResponseEnvelope::err(id, WireError::protocol(reason)))
            }
        }
    }

    async fn execute(&self, id: CorrelationId, command: Command) -> ResponseEnvelope {
        let operation = command.operation();
        let outcome = match command {
            Command::Get { keys } => match keys.as_slice() {
                [key] => self
                    .store
                    .get(key)
                    .await
                    .map(|value| value.unwrap_or(Value::Null)),
                _ => self.store.get_many(&keys).await.map(|values| {
                    Value::Array(
                        values
                            .into_iter()
                            .map(|value| value.unwrap_or(Value::Null))
                            .collect(),
                    )
                }),
            },
            Command::Set {
                key,
                value,
                ttl_millis,
            } => self
                .store
                .set(&key, value, ttl_millis)
                .await
                .map(|()| Value::Null),
            Command::Delete { keys } => self.store.delete(&keys).await.map(|()| Value::Null),
            Command::GetAllKeys => self.store.get_all_keys().await.map(Value::from),
            Command::Clear => self.store.clear().await.map(|()| Value::Null),
        };

        match outcome {
            Ok(result) => ResponseEnvelope::ok(id, result),
            Err(e) => {
                HubStats::bump(&self.stats.storage_failures);
                warn!(correlation_id = %id, operation = %operation, error = %e, "Store operation failed");
                ResponseEnvelope::err(id, WireError::storage_failure(e.to_string()))
            }
        }
    }

    fn reply<C: Channel + ?Sized>(&self, channel: &C, target: &Origin, response: &ResponseEnvelope) {
        match channel.send(target, response.to_json()) {
            Ok(()) => {
                HubStats::bump(&self.stats.replied);
                debug!(
                    correlation_id = %response.id,
                    target = %target,
                    error = response.is_error(),
                    "Reply sent"
                );
            }
            Err(e) => {
                warn!(correlation_id = %response.id, target = %target, error = %e, "Reply not delivered");
            }
        }
    }
}
