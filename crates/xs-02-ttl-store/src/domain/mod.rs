//! # Domain Layer

mod entry;
mod errors;

pub use entry::{Entry, Timestamp};
pub use errors::StoreError;
