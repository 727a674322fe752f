//! # Storage Round Trip
//!
//! A client drives every store operation through a real hub.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use shared_bus::InMemoryTransport;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use xs_04_client::ConnectionState;

    const CONNECT: Duration = Duration::from_secs(5);

    // =========================================================================
    // BASIC OPERATIONS
    // =========================================================================

    #[tokio::test]
    async fn test_set_get_expire_delete() {
        let bridge = bridge(allow_app());
        let client = &bridge.client;
        timeout(CONNECT, client.on_connect()).await.unwrap().unwrap();

        client.set("key1", "foo", None).await.unwrap();
        assert_eq!(client.get("key1").await.unwrap(), Some(json!("foo")));

        client.set("key1", "new", None).await.unwrap();
        assert_eq!(client.get("key1").await.unwrap(), Some(json!("new")));

        client
            .set("key1", "foobar", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(client.get("key1").await.unwrap(), None);
        assert_eq!(client.get("key1").await.unwrap(), None);

        client.set("key1", "a", None).await.unwrap();
        client.set("key2", "b", None).await.unwrap();
        client.del(&["key1", "key2"]).await.unwrap();
        assert_eq!(
            client.get_many(&["key1", "key2"]).await.unwrap(),
            vec![None, None]
        );
    }

    #[tokio::test]
    async fn test_keys_and_clear() {
        let bridge = bridge(allow_app());
        let client = &bridge.client;

        client.set("b", 2, None).await.unwrap();
        client.set("a", 1, None).await.unwrap();
        client
            .set("gone", 0, Some(Duration::from_millis(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(client.get_all_keys().await.unwrap(), vec!["a", "b"]);

        client.clear().await.unwrap();
        assert!(client.get_all_keys().await.unwrap().is_empty());
        assert!(bridge.hub.store().backend().is_empty());
    }

    #[tokio::test]
    async fn test_structured_values_survive() {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Session {
            user: String,
            scopes: Vec<String>,
            expires_in: Option<u32>,
        }

        let bridge = bridge(allow_app());
        let client = &bridge.client;
        let session = Session {
            user: "ada".to_string(),
            scopes: vec!["read".to_string(), "write".to_string()],
            expires_in: None,
        };

        client.set("session", &session, None).await.unwrap();
        client.set("flag", false, None).await.unwrap();
        client.set("count", 1.5, None).await.unwrap();

        assert_eq!(
            client.get_as::<Session>("session").await.unwrap(),
            Some(session)
        );
        assert_eq!(
            client.get_many(&["flag", "count", "missing"]).await.unwrap(),
            vec![Some(json!(false)), Some(json!(1.5)), None]
        );
    }

    // =========================================================================
    // HANDSHAKE
    // =========================================================================

    #[tokio::test]
    async fn test_calls_before_handshake_are_delivered_once_in_order() {
        let transport = InMemoryTransport::new();
        let client = Arc::new(attach_client(&transport, APP, HUB));
        assert_eq!(client.state(), ConnectionState::Connecting);

        let writer = Arc::clone(&client);
        let pending = tokio::spawn(async move {
            writer.set("key1", "first", None).await.unwrap();
            writer.set("key1", "second", None).await.unwrap();
            writer.get("key1").await.unwrap()
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(client.queued_count(), 1);

        let (hub, _task) = start_hub(&transport, HUB, APP, allow_app());
        let read = timeout(CONNECT, pending).await.unwrap().unwrap();

        assert_eq!(read, Some(json!("second")));
        assert_eq!(hub.stats().received, 3);
        assert_eq!(client.queued_count(), 0);
        assert_eq!(client.stats().queued, 1);
    }

    #[tokio::test]
    async fn test_on_connect_waits_forever_without_hub() {
        let transport = InMemoryTransport::new();
        let client = attach_client(&transport, APP, HUB);

        assert!(timeout(Duration::from_millis(100), client.on_connect())
            .await
            .is_err());
        assert_eq!(client.state(), ConnectionState::Connecting);
    }

    // =========================================================================
    // MULTIPLE HUBS
    // =========================================================================

    #[tokio::test]
    async fn test_hubs_keep_separate_stores() {
        const OTHER_HUB: &str = "https://other-hub.test";
        const OTHER_APP: &str = "https://other-app.test";

        let bridge = bridge(allow_app());
        let other_client = attach_client(&bridge.transport, OTHER_APP, OTHER_HUB);
        let (other_hub, _task) = start_hub(
            &bridge.transport,
            OTHER_HUB,
            OTHER_APP,
            xs_03_hub::HubConfig::new(vec![
                xs_01_permission_matcher::PermissionRule::allow_all(OTHER_APP).unwrap(),
            ]),
        );

        bridge.client.set("shared", "first", None).await.unwrap();
        other_client.set("shared", "second", None).await.unwrap();

        assert_eq!(bridge.client.get("shared").await.unwrap(), Some(json!("first")));
        assert_eq!(other_client.get("shared").await.unwrap(), Some(json!("second")));
        assert_eq!(bridge.hub.stats().received, 2);
        assert_eq!(other_hub.stats().received, 2);
    }
}
