//! Cross-crate flows.

#[cfg(test)]
mod fixtures;

mod delivery;
mod permissions;
mod round_trip;
