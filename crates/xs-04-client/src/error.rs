//! Error types for client calls

use shared_bus::TransportError;
use shared_types::{CorrelationId, ErrorKind, WireError};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The client was closed before or while the call was waiting.
    #[error("Client is closed")]
    Closed,

    /// No reply arrived within the configured request timeout.
    #[error("Request {id} timed out after {timeout:?}")]
    Timeout { id: CorrelationId, timeout: Duration },

    /// The hub answered with an error.
    #[error("Hub rejected request: {0}")]
    Remote(#[from] WireError),

    /// The request could not be handed to the transport.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A value could not be encoded for the wire.
    #[error("Failed to encode value: {0}")]
    Encode(String),

    /// The hub's result does not have the expected shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// A request with this id is already outstanding.
    #[error("Correlation id {0} is already pending")]
    DuplicateId(CorrelationId),
}

impl ClientError {
    /// Wire error category when the hub rejected the call.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Remote(error) => Some(error.kind),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.kind() == Some(ErrorKind::PermissionDenied)
    }
}
