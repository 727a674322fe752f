//! # XS-02 TTL Store
//!
//! Key-value store that attaches an optional expiry timestamp to each write
//! and treats expired entries as absent on read.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `Entry` document and `StoreError`
//! - **Ports Layer** (`ports/`): `StorageBackend` and `TimeSource`
//! - **Adapters Layer** (`adapters/`): `InMemoryBackend`, `SystemTimeSource`,
//!   `ManualClock`
//! - **Service Layer** (`service.rs`): `TtlStore`
//!
//! ## Expiry
//!
//! An entry written with `ttl_millis > 0` expires at `now + ttl_millis`. It is
//! absent for every read at or after that instant. Expiry is evaluated on
//! read; [`TtlStore::purge_expired`] is an optional sweep that does not change
//! what reads observe.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use adapters::{InMemoryBackend, ManualClock, SystemTimeSource};
pub use domain::{Entry, StoreError};
pub use ports::{BackendError, StorageBackend, TimeSource};
pub use service::TtlStore;
