//! # XS-03 Hub
//!
//! Trusted-side message handler. Validates the transport-stamped origin of
//! every request against the permission matcher, runs the operation on the
//! TTL store and answers with a reply carrying the request's correlation id.
//!
//! ## Message Flow
//!
//! ```text
//! Delivery{message, sender}
//!     │
//!     ├─ not JSON / no id ─────────────► dropped (no reply)
//!     ├─ bad operation or args ────────► {id, error: protocolError}
//!     ├─ origin not allowed ───────────► {id, error: permissionDenied}
//!     ├─ backend failure ──────────────► {id, error: storageFailure}
//!     └─ ok ───────────────────────────► {id, result}
//! ```
//!
//! ## Lifecycle
//!
//! A hub starts `Uninitialized`. [`Hub::listen`] sends the handshake to the
//! embedding context and moves it to `Listening` for the rest of its life.
//! Messages that arrive before that are dropped.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod locks;
pub mod service;

pub use config::{DispatchMode, HubConfig};
pub use domain::{Command, HubError, HubState, HubStats, HubStatsSnapshot, LockScope};
pub use service::Hub;
