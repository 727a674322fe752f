//! # Domain Layer

mod command;
mod error;
mod state;
mod stats;

pub use command::{Command, LockScope};
pub use error::HubError;
pub use state::HubState;
pub use stats::{HubStats, HubStatsSnapshot};
