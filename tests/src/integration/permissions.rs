//! # Origin Enforcement
//!
//! The hub trusts only the transport-stamped sender origin; the client
//! trusts only messages stamped with its hub's origin.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use serde_json::json;
    use shared_bus::{Channel, InMemoryTransport};
    use shared_types::{
        CorrelationId, ErrorKind, HandshakeMessage, Operation, Origin, RequestEnvelope,
        ResponseEnvelope,
    };
    use xs_01_permission_matcher::PermissionRule;
    use xs_03_hub::HubConfig;
    use xs_04_client::ClientError;

    // =========================================================================
    // HUB SIDE
    // =========================================================================

    #[tokio::test]
    async fn test_unlisted_origin_cannot_mutate() {
        const EVIL: &str = "https://evil.test";

        let transport = InMemoryTransport::new();
        let client = attach_client(&transport, EVIL, HUB);
        let config = HubConfig::new(vec![
            PermissionRule::allow_all("https://*.trusted.test").unwrap(),
        ]);
        let (hub, _task) = start_hub(&transport, HUB, EVIL, config);

        for result in [
            client.set("key1", "pwned", None).await,
            client.del(&["key1"]).await,
            client.clear().await,
        ] {
            let err = result.unwrap_err();
            assert!(err.is_permission_denied(), "unexpected error: {err}");
        }
        assert!(client.get("key1").await.unwrap_err().is_permission_denied());

        assert!(hub.store().backend().is_empty());
        assert_eq!(hub.stats().denied, 4);
    }

    #[tokio::test]
    async fn test_read_only_origin() {
        let config = HubConfig::new(vec![
            PermissionRule::new(APP, [Operation::Get, Operation::GetAllKeys]).unwrap(),
        ]);
        let bridge = bridge(config);
        bridge
            .hub
            .store()
            .set("greeting", json!("hello"), None)
            .await
            .unwrap();

        let client = &bridge.client;
        assert_eq!(client.get("greeting").await.unwrap(), Some(json!("hello")));
        assert_eq!(client.get_all_keys().await.unwrap(), vec!["greeting"]);

        let err = client.set("greeting", "bye", None).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::PermissionDenied));
        assert!(matches!(client.clear().await, Err(ClientError::Remote(_))));
        assert_eq!(client.get("greeting").await.unwrap(), Some(json!("hello")));
    }

    #[tokio::test]
    async fn test_later_rule_grants_operation_earlier_rule_lacks() {
        let config = HubConfig::new(vec![
            PermissionRule::new(APP, [Operation::Get]).unwrap(),
            PermissionRule::allow_all("*").unwrap(),
        ]);
        let bridge = bridge(config);

        bridge.client.set("key1", 1, None).await.unwrap();
        assert_eq!(bridge.client.get("key1").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_operation_denied_when_no_rule_grants_it() {
        let config = HubConfig::new(vec![
            PermissionRule::new(APP, [Operation::Get]).unwrap(),
            PermissionRule::allow_all("https://other.test").unwrap(),
            PermissionRule::new("*", [Operation::GetAllKeys]).unwrap(),
        ]);
        let bridge = bridge(config);

        let err = bridge.client.set("key1", 1, None).await.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(bridge.client.get_all_keys().await.unwrap(), Vec::<String>::new());
        assert!(bridge.hub.store().backend().is_empty());
    }

    #[tokio::test]
    async fn test_request_with_forged_payload_origin_is_still_checked() {
        const EVIL: &str = "https://evil.test";

        let bridge = bridge(allow_app());
        let (evil, mut evil_inbox) = bridge.transport.attach(EVIL).unwrap();

        // The payload claims to come from the trusted app; only the stamp counts.
        let forged = serde_json::json!({
            "id": "forged-1",
            "operation": "set",
            "args": ["key1", "pwned"],
            "origin": APP,
        });
        evil.send(&Origin::new(HUB), forged.to_string()).unwrap();

        let reply = evil_inbox.recv().await.unwrap();
        let response: ResponseEnvelope = serde_json::from_str(&reply.message).unwrap();
        assert_eq!(response.id, CorrelationId::from("forged-1"));
        assert_eq!(
            response.error.map(|e| e.kind),
            Some(ErrorKind::PermissionDenied)
        );
        assert_eq!(bridge.client.get("key1").await.unwrap(), None);
    }

    // =========================================================================
    // CLIENT SIDE
    // =========================================================================

    #[tokio::test]
    async fn test_client_ignores_foreign_traffic() {
        const EVIL: &str = "https://evil.test";

        let transport = InMemoryTransport::new();
        let client = attach_client(&transport, APP, HUB);
        let (evil, _evil_inbox) = transport.attach(EVIL).unwrap();
        let (hub_channel, mut hub_inbox) = transport.attach(HUB).unwrap();
        let app = Origin::new(APP);

        // A foreign handshake does not connect the client.
        evil.send(&app, HandshakeMessage::READY.to_json()).unwrap();
        hub_channel.send(&app, HandshakeMessage::READY.to_json()).unwrap();
        client.on_connect().await.unwrap();

        let call = client.get("key1");
        tokio::pin!(call);
        let request = tokio::select! {
            _ = &mut call => panic!("call resolved before any reply"),
            delivery = hub_inbox.recv() => RequestEnvelope::parse(&delivery.unwrap().message).unwrap(),
        };

        // Same id, wrong stamp: ignored.
        evil.send(&app, ResponseEnvelope::ok(request.id.clone(), json!("forged")).to_json())
            .unwrap();
        hub_channel
            .send(&app, ResponseEnvelope::ok(request.id.clone(), json!("genuine")).to_json())
            .unwrap();

        assert_eq!(call.await.unwrap(), Some(json!("genuine")));
        assert_eq!(client.stats().foreign, 2);
    }
}
