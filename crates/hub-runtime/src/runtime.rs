//! Bridge runtime: one hub and one client on a shared in-memory transport.

use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use shared_bus::{ContextHandle, InMemoryTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use xs_02_ttl_store::{InMemoryBackend, TtlStore};
use xs_03_hub::{Hub, HubError};
use xs_04_client::Client;

pub type BridgeHub = Hub<InMemoryBackend>;
pub type BridgeClient = Client<ContextHandle>;

/// The running bridge.
pub struct BridgeRuntime {
    transport: InMemoryTransport,
    config: RuntimeConfig,
    hub: Arc<BridgeHub>,
    client: BridgeClient,
    hub_task: JoinHandle<Result<(), HubError>>,
    sweeper: Option<JoinHandle<()>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
}

impl BridgeRuntime {
    /// Wire and start the bridge.
    ///
    /// ## Startup Sequence
    ///
    /// 1. Attach the client context and start its receive task
    /// 2. Attach the hub context, send the handshake, start serving
    /// 3. Start the expiry sweep when configured
    ///
    /// The client is attached first so the handshake always has a recipient.
    pub fn start(config: &RuntimeConfig) -> Result<Self> {
        Self::start_on(InMemoryTransport::new(), config)
    }

    /// Like [`BridgeRuntime::start`] over a caller-supplied transport.
    pub fn start_on(transport: InMemoryTransport, config: &RuntimeConfig) -> Result<Self> {
        config.validate().context("Invalid runtime configuration")?;

        let (client_channel, client_inbox) = transport
            .attach(config.client_origin.clone())
            .context("Failed to attach client context")?;
        let client = Client::new(client_channel, client_inbox, config.client_config());

        let (hub_channel, hub_inbox) = transport
            .attach(config.hub_origin.clone())
            .context("Failed to attach hub context")?;
        let store = TtlStore::new(InMemoryBackend::new());
        let hub = Arc::new(Hub::new(config.hub.clone(), store));
        let hub_task = Arc::clone(&hub)
            .start(hub_channel, hub_inbox, &config.client_origin)
            .context("Failed to start hub")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = config
            .purge_interval()
            .map(|period| spawn_sweeper(Arc::clone(&hub), period, shutdown_rx));

        info!(
            hub = %config.hub_origin,
            client = %config.client_origin,
            dispatch = ?config.hub.dispatch,
            sweep = sweeper.is_some(),
            "Bridge runtime started"
        );

        Ok(Self {
            transport,
            config: config.clone(),
            hub,
            client,
            hub_task,
            sweeper,
            shutdown_tx,
        })
    }

    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    pub fn hub(&self) -> &Arc<BridgeHub> {
        &self.hub
    }

    pub fn transport(&self) -> &InMemoryTransport {
        &self.transport
    }

    /// Shut the bridge down.
    ///
    /// ## Shutdown Sequence
    ///
    /// 1. Stop the expiry sweep
    /// 2. Close the client, rejecting anything still pending
    /// 3. Detach the hub so its run loop drains and returns
    pub async fn shutdown(self) -> Result<()> {
        info!("Initiating bridge shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            debug!("No sweep task to signal: {}", e);
        }
        if let Some(sweeper) = self.sweeper {
            if let Err(e) = sweeper.await {
                warn!("Sweep task ended abnormally: {}", e);
            }
        }

        self.client.close();
        self.transport.detach(&self.config.client_origin);
        self.transport.detach(&self.config.hub_origin);

        let outcome = self.hub_task.await.context("Hub task panicked")?;
        outcome.context("Hub stopped with an error")?;

        let stats = self.hub.stats();
        info!(
            received = stats.received,
            replied = stats.replied,
            denied = stats.denied,
            "Shutdown complete"
        );
        Ok(())
    }
}

/// Periodically drop expired entries until shutdown is signalled.
fn spawn_sweeper(
    hub: Arc<BridgeHub>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match hub.purge_expired().await {
                        Ok(0) => {}
                        Ok(purged) => debug!(purged, "Expired entries purged"),
                        Err(e) => error!("Expiry sweep failed: {}", e),
                    }
                }
                _ = shutdown.changed() => {
                    info!("Sweep task shutdown signal received");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use xs_01_permission_matcher::PermissionRule;
    use xs_03_hub::HubConfig;
    use xs_04_client::ClientError;

    const CONNECT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_start_connects_client() {
        let runtime = BridgeRuntime::start(&RuntimeConfig::default()).unwrap();
        tokio::time::timeout(CONNECT, runtime.client().on_connect())
            .await
            .unwrap()
            .unwrap();
        assert!(runtime.hub().is_listening());

        runtime.client().set("key1", "foo", None).await.unwrap();
        assert_eq!(runtime.client().get("key1").await.unwrap(), Some(json!("foo")));

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = RuntimeConfig::default();
        config.hub.permissions.clear();
        assert!(BridgeRuntime::start(&config).is_err());
    }

    #[tokio::test]
    async fn test_restricted_client_is_denied() {
        let mut config = RuntimeConfig::default();
        config.hub = HubConfig::new(vec![PermissionRule::allow_all("https://other.localhost").unwrap()]);

        let runtime = BridgeRuntime::start(&config).unwrap();
        let err = runtime.client().set("key1", 1, None).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert!(runtime.hub().store().backend().is_empty());

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_sweeper_purges_expired_entries() {
        let mut config = RuntimeConfig::default();
        config.purge_interval_ms = Some(10);

        let runtime = BridgeRuntime::start(&config).unwrap();
        runtime
            .client()
            .set("short", "lived", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(runtime.hub().store().backend().len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(runtime.hub().store().backend().is_empty());

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_rejects_later_calls() {
        let runtime = BridgeRuntime::start(&RuntimeConfig::default()).unwrap();
        let hub_origin = runtime.config.hub_origin.clone();
        runtime.client().clear().await.unwrap();

        runtime.client.close();
        assert_eq!(
            runtime.client().get("key1").await.unwrap_err(),
            ClientError::Closed
        );
        assert!(runtime.transport().is_attached(&hub_origin));
        runtime.shutdown().await.unwrap();
    }
}
