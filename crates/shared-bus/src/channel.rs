//! # Channel Port
//!
//! The sending half of a context's connection to the transport.

use shared_types::Origin;
use std::sync::Arc;
use thiserror::Error;

/// A message as received by a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Opaque message text.
    pub message: String,
    /// Origin of the sending context, stamped by the transport.
    pub sender: Origin,
}

/// Errors from transport operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No context is attached under the target origin.
    #[error("No context attached for origin {0}")]
    UnknownTarget(Origin),

    /// The target context existed but its inbox has been dropped.
    #[error("Context {0} is no longer receiving")]
    Disconnected(Origin),

    /// The origin already holds a subscription.
    #[error("Origin {0} is already attached")]
    AlreadyAttached(Origin),
}

/// Handle to the transport bound to one local context.
///
/// Implementations must stamp outgoing messages with [`Channel::local_origin`]
/// on the receiving side; a caller cannot choose the sender identity.
pub trait Channel: Send + Sync + 'static {
    /// Origin of the context this handle belongs to.
    fn local_origin(&self) -> &Origin;

    /// Send a message to the context attached under `target`.
    ///
    /// `Ok` means the transport accepted the message, not that it arrived.
    fn send(&self, target: &Origin, message: String) -> Result<(), TransportError>;
}

impl<C: Channel + ?Sized> Channel for Arc<C> {
    fn local_origin(&self) -> &Origin {
        (**self).local_origin()
    }

    fn send(&self, target: &Origin, message: String) -> Result<(), TransportError> {
        (**self).send(target, message)
    }
}
