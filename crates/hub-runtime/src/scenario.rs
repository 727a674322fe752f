//! Storage round-trip exercised by the binary at startup.

use crate::runtime::BridgeClient;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;
use xs_04_client::ClientError;

/// What the round-trip observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub first_read: Option<Value>,
    pub overwritten_read: Option<Value>,
    pub read_after_expiry: Option<Value>,
    pub keys_before_delete: Vec<String>,
    pub reads_after_delete: Vec<Option<Value>>,
}

/// Set, overwrite, expire and delete a pair of keys.
pub async fn run_scenario(client: &BridgeClient) -> Result<ScenarioReport, ClientError> {
    client.on_connect().await?;
    info!(hub = %client.hub_origin(), "Connected to hub");

    client.set("key1", "foo", None).await?;
    let first_read = client.get("key1").await?;

    client.set("key1", json!({"a": 1}), None).await?;
    let overwritten_read = client.get("key1").await?;

    client
        .set("key2", "bar", Some(Duration::from_millis(50)))
        .await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let read_after_expiry = client.get("key2").await?;

    let keys_before_delete = client.get_all_keys().await?;
    client.del(&["key1", "key2"]).await?;
    let reads_after_delete = client.get_many(&["key1", "key2"]).await?;

    let report = ScenarioReport {
        first_read,
        overwritten_read,
        read_after_expiry,
        keys_before_delete,
        reads_after_delete,
    };
    info!(?report, "Storage round-trip finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::runtime::BridgeRuntime;

    #[tokio::test]
    async fn test_scenario_report() {
        let runtime = BridgeRuntime::start(&RuntimeConfig::default()).unwrap();
        let report = run_scenario(runtime.client()).await.unwrap();

        assert_eq!(report.first_read, Some(json!("foo")));
        assert_eq!(report.overwritten_read, Some(json!({"a": 1})));
        assert_eq!(report.read_after_expiry, None);
        assert_eq!(report.keys_before_delete, vec!["key1".to_string()]);
        assert_eq!(report.reads_after_delete, vec![None, None]);

        runtime.shutdown().await.unwrap();
    }
}
