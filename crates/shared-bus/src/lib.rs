//! # Shared Bus - Message Transport Between Execution Contexts
//!
//! The raw transport primitive the hub and the client talk over.
//!
//! ## Transport Contract
//!
//! - `send(target, message)` delivers opaque text asynchronously.
//! - Delivery is NOT ordered and NOT guaranteed; messages may be duplicated.
//! - Every delivery is stamped with the sender's [`Origin`] by the
//!   transport itself. Receivers must trust this stamp, never the payload.
//! - Each context holds exactly one subscription ([`Inbox`]) for its lifetime.
//!
//! ```text
//! ┌──────────────┐   send(hub, msg)   ┌──────────────┐   Delivery {     ┌──────────────┐
//! │  Context A   │ ─────────────────→ │  Transport   │ ───msg, sender──→│  Context B   │
//! │ (origin = a) │                    │ stamps "a"   │     = a }        │   Inbox      │
//! └──────────────┘                    └──────────────┘                  └──────────────┘
//! ```
//!
//! [`InMemoryTransport`] is the reference adapter; its [`FaultConfig`]
//! reproduces the unreliable behaviour (loss, duplication, reordering) that
//! the protocol built on top must tolerate.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod faults;
pub mod inbox;
pub mod memory;

// Re-export main types
pub use channel::{Channel, Delivery, TransportError};
pub use faults::FaultConfig;
pub use inbox::Inbox;
pub use memory::{ContextHandle, InMemoryTransport, TransportStats};
pub use shared_types::Origin;
