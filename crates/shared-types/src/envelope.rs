//! # Channel Envelopes
//!
//! Every message on the channel is one of three JSON documents:
//!
//! ```text
//! client → hub   {"id": "<uuid>", "operation": "get", "args": ["key1"]}
//! hub → client   {"id": "<uuid>", "result": "foo"}
//!                {"id": "<uuid>", "error": {"kind": "permissionDenied", "message": "..."}}
//!                {"handshake": "ready"}
//! ```
//!
//! ## Security Properties
//!
//! - **Correlation**: a response carries the id of the request it answers.
//! - **No Identity in Payload**: envelopes never name their sender; the
//!   transport stamps the origin on delivery.

use crate::errors::{MessageError, WireError};
use crate::operation::Operation;
use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Correlation ID pairing a request with its single reply.
///
/// Generated ids are UUID v4 strings. Inbound ids are treated as opaque text
/// so a hub can answer any client that sends a non-empty id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

/// Request sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: CorrelationId,
    pub operation: Operation,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RequestEnvelope {
    pub fn new(operation: Operation, args: Vec<Value>) -> Self {
        Self {
            id: CorrelationId::new(),
            operation,
            args,
        }
    }

    pub fn to_json(&self) -> String {
        // A struct of strings and JSON values always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode a raw channel message.
    ///
    /// Decoding is staged so that as much as possible is recovered: once an
    /// id is found, later failures carry it so the sender can be answered.
    pub fn parse(raw: &str) -> Result<Self, MessageError> {
        let doc: Value =
            serde_json::from_str(raw).map_err(|e| MessageError::NotJson(e.to_string()))?;
        let Value::Object(mut fields) = doc else {
            return Err(MessageError::NotAnObject);
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => CorrelationId(id),
            _ => return Err(MessageError::MissingId),
        };

        let operation = match fields.remove("operation") {
            Some(Value::String(name)) => name
                .parse::<Operation>()
                .map_err(|_| MessageError::UnknownOperation {
                    id: id.clone(),
                    name,
                })?,
            Some(other) => {
                return Err(MessageError::UnknownOperation {
                    id,
                    name: other.to_string(),
                })
            }
            None => return Err(MessageError::MissingOperation { id }),
        };

        let args = match fields.remove("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(args)) => args,
            Some(_) => {
                return Err(MessageError::InvalidArgs {
                    id,
                    reason: "args must be an array".to_string(),
                })
            }
        };

        Ok(Self {
            id,
            operation,
            args,
        })
    }
}

/// Reply sent by a hub.
///
/// A response without `error` is a success; `result` defaults to `null` so a
/// `get` of an absent key round-trips as an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: CorrelationId,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl ResponseEnvelope {
    pub fn ok(id: CorrelationId, result: Value) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    pub fn err(id: CorrelationId, error: WireError) -> Self {
        Self {
            id,
            result: Value::Null,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> Result<Value, WireError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Marker value of the handshake message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandshakeSignal {
    Ready,
}

/// One-time message a hub sends when it starts listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeMessage {
    pub handshake: HandshakeSignal,
}

impl HandshakeMessage {
    pub const READY: HandshakeMessage = HandshakeMessage {
        handshake: HandshakeSignal::Ready,
    };

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Anything a client may receive from its hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HubMessage {
    Handshake(HandshakeMessage),
    Response(ResponseEnvelope),
}

impl HubMessage {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Correlation id named by a message that failed [`HubMessage::parse`],
    /// so the matching call can still be failed.
    pub fn recover_id(raw: &str) -> Option<CorrelationId> {
        match serde_json::from_str::<Value>(raw).ok()?.get("id")? {
            Value::String(id) if !id.is_empty() => Some(CorrelationId(id.clone())),
            _ => None,
        }
    }
}
