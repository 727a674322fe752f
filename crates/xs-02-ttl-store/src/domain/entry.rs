use serde::{Deserialize, Serialize};
use shared_types::Value;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Stored document for one key.
///
/// Persisted in the backend as `{"value": ..., "expiresAt": ...}`; the
/// `expiresAt` field is omitted for entries that never expire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub value: Value,
    #[serde(
        rename = "expiresAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Timestamp>,
}

impl Entry {
    /// Build an entry written at `now`.
    ///
    /// A missing or non-positive `ttl_millis` means the entry never expires.
    pub fn new(value: Value, now: Timestamp, ttl_millis: Option<i64>) -> Self {
        let expires_at = ttl_millis
            .filter(|ttl| *ttl > 0)
            .map(|ttl| now.saturating_add(ttl.unsigned_abs()));
        Self { value, expires_at }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
