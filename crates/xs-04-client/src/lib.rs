//! # XS-04 Client
//!
//! Requesting-side API of the storage bridge. Issues store operations to a
//! hub over an unordered, unreliable channel and pairs every reply with the
//! call that caused it.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): connection state machine, pending request
//!   table, counters
//! - **Service Layer** (`service.rs`): `Client`, its receive task and the
//!   generic `call`
//! - **Storage API** (`storage_api.rs`): `set`/`get`/`get_many`/`del`/
//!   `get_all_keys`/`clear` wrappers
//!
//! ## Guarantees
//!
//! - Calls issued before the handshake are buffered and delivered once, in
//!   issue order, right after it.
//! - A reply resolves at most one call; replies for unknown ids are dropped.
//! - Only messages stamped with the configured hub origin are considered.
//! - There is no reconnection: a silent hub leaves `on_connect` pending
//!   forever and calls pending until their request timeout.
//!
//! ## Usage Example
//!
//! ```ignore
//! let (channel, inbox) = transport.attach("https://app.example.com")?;
//! let client = Client::new(channel, inbox, ClientConfig::new("https://hub.example.com"));
//!
//! tokio::time::timeout(Duration::from_secs(5), client.on_connect()).await??;
//! client.set("key1", "foo", None).await?;
//! assert_eq!(client.get("key1").await?, Some(json!("foo")));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage_api;

pub use config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use domain::{ClientStats, ClientStatsSnapshot, ConnectionState};
pub use error::ClientError;
pub use service::Client;
