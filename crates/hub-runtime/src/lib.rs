//! # Hub Runtime
//!
//! Wires a [`xs_03_hub::Hub`] and a [`xs_04_client::Client`] over one
//! [`shared_bus::InMemoryTransport`].
//!
//! - `config.rs` - file and environment configuration
//! - `logging.rs` - tracing subscriber setup
//! - `runtime.rs` - startup, expiry sweep and shutdown
//! - `scenario.rs` - storage round-trip run by the binary

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod logging;
pub mod runtime;
pub mod scenario;

pub use config::{ConfigError, LoggingConfig, RuntimeConfig};
pub use logging::{init_logging, LoggingError};
pub use runtime::{BridgeClient, BridgeHub, BridgeRuntime};
pub use scenario::{run_scenario, ScenarioReport};
