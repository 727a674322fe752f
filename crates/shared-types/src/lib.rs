//! # Shared Types Crate
//!
//! This crate contains the wire model exchanged between a storage client and
//! its hub.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every message that crosses the channel is
//!   defined here.
//! - **Transport Authority**: payloads never carry the sender's identity; the
//!   [`Origin`] of a message is stamped by the transport on delivery.
//! - **Structured Data Only**: envelopes are plain JSON documents so they
//!   survive any transport that can move text.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod envelope;
pub mod errors;
pub mod operation;
pub mod origin;

pub use envelope::{
    CorrelationId, HandshakeMessage, HandshakeSignal, HubMessage, RequestEnvelope,
    ResponseEnvelope,
};
pub use errors::{ErrorKind, MessageError, WireError};
pub use operation::Operation;
pub use origin::{Origin, OriginParts};

/// Arbitrary serializable value stored under a key.
pub type Value = serde_json::Value;
