//! # Delivery Semantics
//!
//! Concurrent hub dispatch and a transport that duplicates and reorders
//! messages.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use serde_json::{json, Value};
    use shared_bus::{Channel, FaultConfig, InMemoryTransport};
    use shared_types::{Operation, Origin, RequestEnvelope, ResponseEnvelope};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinSet;
    use tokio::time::timeout;
    use xs_03_hub::DispatchMode;

    const DEADLINE: Duration = Duration::from_secs(10);

    fn concurrent(max_in_flight: usize) -> xs_03_hub::HubConfig {
        allow_app().with_dispatch(DispatchMode::Concurrent { max_in_flight })
    }

    // =========================================================================
    // CONCURRENT DISPATCH
    // =========================================================================

    /// Requests are written straight to the hub so their arrival order is
    /// known; the client API would not expose it.
    #[tokio::test]
    async fn test_concurrent_hub_keeps_last_writer_per_key() {
        let transport = InMemoryTransport::new();
        let (app, mut app_inbox) = transport.attach(APP).unwrap();
        let (hub, _task) = start_hub(&transport, HUB, APP, concurrent(8));
        let hub_origin = Origin::new(HUB);

        // Handshake
        app_inbox.recv().await.unwrap();

        let mut sent = 0;
        for round in 0..25 {
            for key in ["hot", "warm"] {
                let request = RequestEnvelope::new(
                    Operation::Set,
                    vec![json!(key), json!(format!("{key}-{round}"))],
                );
                app.send(&hub_origin, request.to_json()).unwrap();
                sent += 1;
            }
        }
        for _ in 0..sent {
            let reply = timeout(DEADLINE, app_inbox.recv()).await.unwrap().unwrap();
            let response: ResponseEnvelope = serde_json::from_str(&reply.message).unwrap();
            assert!(!response.is_error());
        }

        assert_eq!(hub.store().get("hot").await.unwrap(), Some(json!("hot-24")));
        assert_eq!(hub.store().get("warm").await.unwrap(), Some(json!("warm-24")));
        assert_eq!(hub.stats().replied, sent);
    }

    #[tokio::test]
    async fn test_concurrent_hub_serves_parallel_clients_calls() {
        let bridge = bridge(concurrent(4));
        let mut calls = JoinSet::new();
        for i in 0..32 {
            let client = Arc::clone(&bridge.client);
            calls.spawn(async move {
                let key = format!("key-{i}");
                client.set(&key, i, None).await.unwrap();
                (i, client.get(&key).await.unwrap())
            });
        }

        while let Some(joined) = calls.join_next().await {
            let (i, value) = joined.unwrap();
            assert_eq!(value, Some(json!(i)));
        }
        assert_eq!(bridge.client.get_all_keys().await.unwrap().len(), 32);
    }

    // =========================================================================
    // UNRELIABLE TRANSPORT
    // =========================================================================

    #[tokio::test]
    async fn test_duplicated_and_reordered_messages() {
        let bridge = bridge_on(InMemoryTransport::with_faults(FaultConfig::chaotic(7)), allow_app());

        let mut writes = JoinSet::new();
        for i in 0..20 {
            let client = Arc::clone(&bridge.client);
            writes.spawn(async move { client.set(&format!("key-{i}"), i, None).await });
        }
        while let Some(joined) = writes.join_next().await {
            joined.unwrap().unwrap();
        }

        let keys: Vec<String> = (0..20).map(|i| format!("key-{i}")).collect();
        let values = timeout(DEADLINE, bridge.client.get_many(&keys))
            .await
            .unwrap()
            .unwrap();
        let expected: Vec<Option<Value>> = (0..20).map(|i| Some(json!(i))).collect();
        assert_eq!(values, expected);

        // Each call resolved exactly once even though replies were duplicated.
        let stats = bridge.client.stats();
        assert_eq!(stats.completed, 21);
        assert_eq!(bridge.client.pending_count(), 0);
        assert!(bridge.transport.stats().duplicated.load(Ordering::Relaxed) > 0);
    }

    #[tokio::test]
    async fn test_lost_reply_surfaces_as_timeout() {
        let transport = InMemoryTransport::new();
        let (app_channel, app_inbox) = transport.attach(APP).unwrap();
        let client = xs_04_client::Client::new(
            app_channel,
            app_inbox,
            xs_04_client::ClientConfig::new(HUB).with_request_timeout(Some(Duration::from_millis(50))),
        );
        // A hub end that handshakes and never answers.
        let (hub_channel, _hub_inbox) = transport.attach(HUB).unwrap();
        hub_channel
            .send(&Origin::new(APP), shared_types::HandshakeMessage::READY.to_json())
            .unwrap();

        let err = client.get("key1").await.unwrap_err();
        assert!(matches!(err, xs_04_client::ClientError::Timeout { .. }));
        assert_eq!(client.pending_count(), 0);
        assert_eq!(client.stats().timeouts, 1);
    }
}
