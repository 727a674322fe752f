//! # Inbox
//!
//! The receiving half of a context's connection: its single subscription.

use crate::channel::Delivery;
use shared_types::Origin;
use tokio::sync::mpsc;
use tracing::debug;

/// Subscription receiving every message addressed to one context.
///
/// When dropped, senders targeting this context get
/// [`TransportError::Disconnected`](crate::TransportError::Disconnected).
pub struct Inbox {
    origin: Origin,
    receiver: mpsc::UnboundedReceiver<Delivery>,
}

impl Inbox {
    pub(crate) fn new(origin: Origin, receiver: mpsc::UnboundedReceiver<Delivery>) -> Self {
        Self { origin, receiver }
    }

    /// Receive the next delivery.
    ///
    /// # Returns
    ///
    /// - `Some(delivery)` - The next message
    /// - `None` - The transport was dropped
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.receiver.recv().await
    }

    /// Receive without waiting.
    ///
    /// Returns `None` when nothing is queued right now.
    pub fn try_recv(&mut self) -> Option<Delivery> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Inbox {
    fn drop(&mut self) {
        debug!(origin = %self.origin, "Inbox dropped");
    }
}
