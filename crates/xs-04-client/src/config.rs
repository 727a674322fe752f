//! Client configuration.

use shared_types::Origin;
use std::time::Duration;

/// Default time a call waits for its reply.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Only messages stamped with this origin are accepted as replies.
    pub hub_origin: Origin,
    /// Per-call deadline. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(hub_origin: impl Into<Origin>) -> Self {
        Self {
            hub_origin: hub_origin.into(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}
