//! # Storage API
//!
//! Typed wrappers over [`Client::call`].

use crate::error::ClientError;
use crate::service::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_bus::Channel;
use shared_types::{Operation, Value};
use std::time::Duration;

impl<C: Channel> Client<C> {
    /// Store `value` under `key`.
    ///
    /// With a non-zero `ttl` the entry reads as absent once it elapses.
    pub async fn set<V: Serialize>(
        &self,
        key: &str,
        value: V,
        ttl: Option<Duration>,
    ) -> Result<(), ClientError> {
        let value = serde_json::to_value(value).map_err(|e| ClientError::Encode(e.to_string()))?;
        let mut args = vec![Value::from(key), value];
        if let Some(ttl) = ttl {
            args.push(Value::from(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)));
        }
        self.call(Operation::Set, args).await?;
        Ok(())
    }

    /// Value stored under `key`, `None` when absent or expired.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, ClientError> {
        let value = self.call(Operation::Get, vec![Value::from(key)]).await?;
        Ok(present(value))
    }

    /// Values for `keys`, one per key in the same order.
    pub async fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<Option<Value>>, ClientError> {
        match keys {
            [] => Ok(Vec::new()),
            // A single-key get is answered with a bare value.
            [key] => Ok(vec![self.get(key.as_ref()).await?]),
            _ => {
                let args = keys.iter().map(|key| Value::from(key.as_ref())).collect();
                match self.call(Operation::Get, args).await? {
                    Value::Array(values) if values.len() == keys.len() => {
                        Ok(values.into_iter().map(present).collect())
                    }
                    other => Err(ClientError::UnexpectedResult(format!(
                        "expected {} values, got {other}",
                        keys.len()
                    ))),
                }
            }
        }
    }

    /// Value under `key` decoded as `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let Some(value) = self.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ClientError::UnexpectedResult(e.to_string()))
    }

    /// Remove `keys`. Absent keys are ignored.
    pub async fn del<K: AsRef<str>>(&self, keys: &[K]) -> Result<(), ClientError> {
        let args = keys.iter().map(|key| Value::from(key.as_ref())).collect();
        self.call(Operation::Delete, args).await?;
        Ok(())
    }

    /// Keys holding a live entry.
    pub async fn get_all_keys(&self) -> Result<Vec<String>, ClientError> {
        let keys = self.call(Operation::GetAllKeys, Vec::new()).await?;
        serde_json::from_value(keys).map_err(|e| ClientError::UnexpectedResult(e.to_string()))
    }

    /// Remove every entry.
    pub async fn clear(&self) -> Result<(), ClientError> {
        self.call(Operation::Clear, Vec::new()).await?;
        Ok(())
    }
}

/// `null` on the wire means absent.
fn present(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        value => Some(value),
    }
}
