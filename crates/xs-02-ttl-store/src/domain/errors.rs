//! # Domain Errors

use crate::ports::BackendError;
use thiserror::Error;

/// Errors surfaced by [`TtlStore`](crate::TtlStore) operations.
///
/// Both variants reach the wire as a storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] BackendError),

    #[error("Corrupt entry for key {key}: {reason}")]
    CorruptEntry { key: String, reason: String },
}
