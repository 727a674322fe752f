//! # Error Types
//!
//! Defines the error taxonomy that crosses the channel, plus decode errors
//! for inbound envelopes.

use crate::envelope::CorrelationId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a failed request, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Origin/operation pair is not allow-listed. Not retried.
    PermissionDenied,
    /// Backend I/O error. Not retried by this layer.
    StorageFailure,
    /// Request carried a correlation id but could not be executed as sent.
    ProtocolError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::PermissionDenied => write!(f, "permission denied"),
            ErrorKind::StorageFailure => write!(f, "storage failure"),
            ErrorKind::ProtocolError => write!(f, "protocol error"),
        }
    }
}

/// Error payload of a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct WireError {
    pub kind: ErrorKind,
    pub message: String,
}

impl WireError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    pub fn storage_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageFailure, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProtocolError, message)
    }
}

/// Errors raised while decoding an inbound request envelope.
///
/// Variants without a correlation id cannot be answered and are dropped by
/// the receiver; the remaining variants carry the id to reply to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Message text is not a JSON document.
    #[error("Message is not valid JSON: {0}")]
    NotJson(String),

    /// Message is JSON but not an object.
    #[error("Message is not an object")]
    NotAnObject,

    /// No usable correlation id.
    #[error("Message has no correlation id")]
    MissingId,

    /// No operation name was supplied.
    #[error("Request {id} has no operation")]
    MissingOperation { id: CorrelationId },

    /// Operation name is not recognized.
    #[error("Request {id} names unknown operation {name:?}")]
    UnknownOperation { id: CorrelationId, name: String },

    /// Arguments do not fit the operation.
    #[error("Request {id} has invalid arguments: {reason}")]
    InvalidArgs { id: CorrelationId, reason: String },
}

impl MessageError {
    /// The correlation id to answer, if one could be recovered.
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        match self {
            MessageError::NotJson(_) | MessageError::NotAnObject | MessageError::MissingId => None,
            MessageError::MissingOperation { id }
            | MessageError::UnknownOperation { id, .. }
            | MessageError::InvalidArgs { id, .. } => Some(id),
        }
    }
}
