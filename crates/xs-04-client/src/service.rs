//! # Client Service
//!
//! Requesting-side end of the channel.
//!
//! ```text
//! call(op, args)
//!     │
//!     ├─ register PendingRequest{id}
//!     ├─ Connecting ──► buffer (FIFO) ──► flushed on handshake
//!     └─ Connected  ──► send {id, operation, args} to hub
//!
//! receive task
//!     ├─ sender ≠ hub origin ──► ignored
//!     ├─ {handshake} ──────────► Connecting → Connected, flush buffer
//!     ├─ {id, result|error} ───► resolve PendingRequest{id}, or discard
//!     └─ {id, <malformed>} ────► fail PendingRequest{id} with protocolError
//! ```

use crate::config::ClientConfig;
use crate::domain::{
    ClientStats, ClientStatsSnapshot, Connection, ConnectionState, PendingRequests, Phase,
};
use crate::error::ClientError;
use parking_lot::Mutex;
use shared_bus::{Channel, Delivery, Inbox};
use shared_types::{
    CorrelationId, HubMessage, Operation, Origin, RequestEnvelope, Value, WireError,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct ClientInner<C> {
    channel: C,
    config: ClientConfig,
    connection: Mutex<Connection>,
    phase: watch::Sender<Phase>,
    pending: PendingRequests,
    stats: Arc<ClientStats>,
}

/// Storage client bound to one hub.
///
/// Dropping the client stops its receive task; calls still waiting then
/// resolve with [`ClientError::Closed`].
pub struct Client<C: Channel> {
    inner: Arc<ClientInner<C>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
}

/// Removes a call's pending entry and buffered request if the call stops
/// waiting before its reply arrives.
struct CallGuard<'a, C> {
    inner: &'a ClientInner<C>,
    id: CorrelationId,
}

impl<C> Drop for CallGuard<'_, C> {
    fn drop(&mut self) {
        if self.inner.pending.abandon(&self.id) {
            self.inner.connection.lock().unqueue(&self.id);
            debug!(correlation_id = %self.id, "Pending request discarded locally");
        }
    }
}

impl<C: Channel> Client<C> {
    /// Create a client over `channel`, consuming the context's single
    /// subscription.
    ///
    /// Must be called inside a Tokio runtime: the receive task is spawned
    /// immediately and the client stays `Connecting` until the hub's
    /// handshake arrives.
    pub fn new(channel: C, inbox: Inbox, config: ClientConfig) -> Self {
        let stats = Arc::new(ClientStats::default());
        let (phase, _) = watch::channel(Phase::Connecting);
        let inner = Arc::new(ClientInner {
            channel,
            config,
            connection: Mutex::new(Connection::default()),
            phase,
            pending: PendingRequests::new(Arc::clone(&stats)),
            stats,
        });

        debug!(
            client = %inner.channel.local_origin(),
            hub = %inner.config.hub_origin,
            "Client connecting"
        );

        let receiver = tokio::spawn(Arc::clone(&inner).receive(inbox));
        Self {
            inner,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.connection.lock().state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn is_closed(&self) -> bool {
        self.inner.connection.lock().phase == Phase::Closed
    }

    pub fn hub_origin(&self) -> &Origin {
        &self.inner.config.hub_origin
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Calls waiting for a reply.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Calls buffered until the handshake.
    pub fn queued_count(&self) -> usize {
        self.inner.connection.lock().queue.len()
    }

    pub fn stats(&self) -> ClientStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Resolve once the hub's handshake has been received.
    ///
    /// Returns immediately when already connected. While the hub stays
    /// silent this never resolves; wrap it in `tokio::time::timeout` to
    /// bound the wait. Fails with `Closed` once the client is closed.
    pub async fn on_connect(&self) -> Result<(), ClientError> {
        let mut watcher = self.inner.phase.subscribe();
        let settled = *watcher
            .wait_for(|phase| *phase != Phase::Connecting)
            .await
            .map_err(|_| ClientError::Closed)?;

        match settled {
            Phase::Connected => Ok(()),
            Phase::Connecting | Phase::Closed => Err(ClientError::Closed),
        }
    }

    /// Issue `operation` and wait for its correlated reply.
    ///
    /// Calls made before the handshake are buffered and sent, in order,
    /// right after it. If the configured request timeout elapses, or the
    /// returned future is dropped, the call is discarded locally and a late
    /// reply is ignored; the hub is not told.
    pub async fn call(&self, operation: Operation, args: Vec<Value>) -> Result<Value, ClientError> {
        let request = RequestEnvelope::new(operation, args);
        let id = request.id.clone();

        // Checked under the connection lock: `close` flips the phase there
        // before failing the table, so a registration cannot slip past it.
        let reply = {
            let connection = self.inner.connection.lock();
            if connection.phase == Phase::Closed {
                return Err(ClientError::Closed);
            }
            self.inner.pending.register(&id, operation)?
        };
        let guard = CallGuard {
            inner: &self.inner,
            id: id.clone(),
        };
        self.inner.submit(request)?;

        let outcome = match self.inner.config.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, reply).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    ClientStats::bump(&self.inner.stats.timeouts);
                    warn!(
                        correlation_id = %id,
                        operation = %operation,
                        timeout_ms = limit.as_millis(),
                        "Request timed out"
                    );
                    drop(guard);
                    return Err(ClientError::Timeout { id, timeout: limit });
                }
            },
            None => reply.await,
        };
        drop(guard);

        // A dropped sender means the table was torn down.
        outcome.unwrap_or(Err(ClientError::Closed))
    }

    /// Stop the client.
    ///
    /// Every outstanding call resolves with `Closed`, buffered requests are
    /// discarded, and later calls fail with `Closed`. Idempotent.
    pub fn close(&self) {
        {
            let mut connection = self.inner.connection.lock();
            if connection.phase == Phase::Closed {
                return;
            }
            connection.phase = Phase::Closed;
            connection.queue.clear();
        }
        self.inner.phase.send_replace(Phase::Closed);

        if let Some(receiver) = self.receiver.lock().take() {
            receiver.abort();
        }

        let failed = self.inner.pending.fail_all(&ClientError::Closed);
        info!(hub = %self.inner.config.hub_origin, failed, "Client closed");
    }
}

impl<C: Channel> Drop for Client<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Channel> ClientInner<C> {
    /// Send now, or buffer while connecting.
    fn submit(&self, request: RequestEnvelope) -> Result<(), ClientError> {
        let mut connection = self.connection.lock();
        match connection.phase {
            Phase::Closed => Err(ClientError::Closed),
            Phase::Connecting => {
                debug!(
                    correlation_id = %request.id,
                    operation = %request.operation,
                    queued = connection.queue.len() + 1,
                    "Request buffered until handshake"
                );
                connection.queue.push_back(request);
                ClientStats::bump(&self.stats.queued);
                Ok(())
            }
            Phase::Connected => self.transmit(&request),
        }
    }

    fn transmit(&self, request: &RequestEnvelope) -> Result<(), ClientError> {
        self.channel
            .send(&self.config.hub_origin, request.to_json())?;
        debug!(
            correlation_id = %request.id,
            operation = %request.operation,
            "Request sent"
        );
        Ok(())
    }

    async fn receive(self: Arc<Self>, mut inbox: Inbox) {
        while let Some(delivery) = inbox.recv().await {
            self.handle(delivery);
        }
        debug!(client = %self.channel.local_origin(), "Transport closed, receive task stopped");
    }

    fn handle(&self, delivery: Delivery) {
        if delivery.sender != self.config.hub_origin {
            ClientStats::bump(&self.stats.foreign);
            warn!(
                origin = %delivery.sender,
                hub = %self.config.hub_origin,
                "Ignoring message from foreign origin"
            );
            return;
        }

        match HubMessage::parse(&delivery.message) {
            Ok(HubMessage::Handshake(_)) => self.on_handshake(),
            Ok(HubMessage::Response(response)) => {
                let id = response.id.clone();
                self.pending
                    .complete(&id, response.into_result().map_err(ClientError::Remote));
            }
            Err(e) => match HubMessage::recover_id(&delivery.message) {
                Some(id) => {
                    warn!(correlation_id = %id, error = %e, "Malformed reply from hub");
                    let error = WireError::protocol(format!("malformed reply: {e}"));
                    self.pending.complete(&id, Err(ClientError::Remote(error)));
                }
                None => debug!(error = %e, "Ignoring unparseable message from hub"),
            },
        }
    }

    /// Connecting → Connected, then flush the buffer in FIFO order.
    fn on_handshake(&self) {
        let mut connection = self.connection.lock();
        if connection.phase != Phase::Connecting {
            debug!("Repeated handshake ignored");
            return;
        }
        connection.phase = Phase::Connected;

        let buffered = std::mem::take(&mut connection.queue);
        let flushed = buffered.len();
        for request in buffered {
            if let Err(e) = self.transmit(&request) {
                warn!(correlation_id = %request.id, error = %e, "Buffered request not delivered");
                self.pending.complete(&request.id, Err(e));
            }
        }
        drop(connection);

        self.phase.send_replace(Phase::Connected);
        info!(hub = %self.config.hub_origin, flushed, "Connected to hub");
    }
}
