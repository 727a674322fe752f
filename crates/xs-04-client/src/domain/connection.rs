use shared_types::{CorrelationId, RequestEnvelope};
use std::collections::VecDeque;

/// Connection to the hub. Moves to `Connected` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
}

/// Lifecycle broadcast to `on_connect` waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    Connecting,
    Connected,
    Closed,
}

/// Connection phase plus the requests buffered while connecting.
///
/// Kept behind one lock so that flushing the buffer and sending a new
/// request can never interleave.
#[derive(Debug, Default)]
pub(crate) struct Connection {
    pub phase: Phase,
    pub queue: VecDeque<RequestEnvelope>,
}

impl Connection {
    pub fn state(&self) -> ConnectionState {
        match self.phase {
            Phase::Connected => ConnectionState::Connected,
            // A client closed before the handshake never connected.
            Phase::Connecting | Phase::Closed => ConnectionState::Connecting,
        }
    }

    /// Remove a still-buffered request. Returns whether it was found.
    pub fn unqueue(&mut self, id: &CorrelationId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|request| &request.id != id);
        self.queue.len() != before
    }
}
