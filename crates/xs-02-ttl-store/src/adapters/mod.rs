//! # Adapters Layer

mod clock;
mod memory;

pub use clock::{ManualClock, SystemTimeSource};
pub use memory::InMemoryBackend;
