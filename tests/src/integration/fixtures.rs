//! Bridge setup shared by the integration flows.

use shared_bus::{ContextHandle, InMemoryTransport};
use shared_types::Origin;
use std::sync::Arc;
use tokio::task::JoinHandle;
use xs_01_permission_matcher::PermissionRule;
use xs_02_ttl_store::{InMemoryBackend, TtlStore};
use xs_03_hub::{Hub, HubConfig, HubError};
use xs_04_client::{Client, ClientConfig};

pub const HUB: &str = "https://hub.test";
pub const APP: &str = "https://app.test";

pub type TestHub = Hub<InMemoryBackend>;
pub type TestClient = Client<ContextHandle>;

/// A started hub and a client embedding it.
pub struct Bridge {
    pub transport: InMemoryTransport,
    pub hub: Arc<TestHub>,
    pub hub_task: JoinHandle<Result<(), HubError>>,
    pub client: Arc<TestClient>,
}

/// Hub rules granting `APP` every operation.
pub fn allow_app() -> HubConfig {
    HubConfig::new(vec![PermissionRule::allow_all(APP).unwrap()])
}

pub fn bridge(config: HubConfig) -> Bridge {
    bridge_on(InMemoryTransport::new(), config)
}

pub fn bridge_on(transport: InMemoryTransport, config: HubConfig) -> Bridge {
    let client = attach_client(&transport, APP, HUB);
    let (hub, hub_task) = start_hub(&transport, HUB, APP, config);
    Bridge {
        transport,
        hub,
        hub_task,
        client: Arc::new(client),
    }
}

pub fn attach_client(transport: &InMemoryTransport, origin: &str, hub: &str) -> TestClient {
    let (channel, inbox) = transport.attach(origin).unwrap();
    Client::new(channel, inbox, ClientConfig::new(hub))
}

/// Attach a hub under `origin` and start it for `embedder`.
pub fn start_hub(
    transport: &InMemoryTransport,
    origin: &str,
    embedder: &str,
    config: HubConfig,
) -> (Arc<TestHub>, JoinHandle<Result<(), HubError>>) {
    let (channel, inbox) = transport.attach(origin).unwrap();
    let hub = Arc::new(Hub::new(config, TtlStore::new(InMemoryBackend::new())));
    let task = Arc::clone(&hub)
        .start(channel, inbox, &Origin::new(embedder))
        .unwrap();
    (hub, task)
}
