//! # Domain Layer

mod connection;
mod pending;
mod stats;

pub use connection::ConnectionState;
pub(crate) use connection::{Connection, Phase};
pub(crate) use pending::PendingRequests;
pub use stats::{ClientStats, ClientStatsSnapshot};
