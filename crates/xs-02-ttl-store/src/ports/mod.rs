//! # Ports Layer

pub mod outbound;

pub use outbound::{BackendError, StorageBackend, TimeSource};
