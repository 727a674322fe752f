//! # Cross-Storage Hub Runtime
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`XS_CONFIG` file, then `XS_*` environment)
//! 2. Initialize logging
//! 3. Start the hub and the client
//! 4. Run the storage round-trip
//! 5. Wait for Ctrl+C, then shut down

use anyhow::{Context, Result};
use hub_runtime::{init_logging, run_scenario, BridgeRuntime, RuntimeConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    let runtime = BridgeRuntime::start(&config)?;

    match run_scenario(runtime.client()).await {
        Ok(report) => info!(keys = ?report.keys_before_delete, "Round-trip succeeded"),
        Err(e) => error!("Round-trip failed: {}", e),
    }

    info!("Bridge is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await
}
