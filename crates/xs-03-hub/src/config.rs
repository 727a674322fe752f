//! Hub configuration.

use serde::{Deserialize, Serialize};
use xs_01_permission_matcher::{PatternError, PermissionMatcher, PermissionRule};

/// Default in-flight bound for concurrent dispatch.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// How the run loop executes requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum DispatchMode {
    /// One request at a time, in arrival order.
    #[default]
    Sequential,
    /// Requests on disjoint keys run in parallel; requests sharing a key run
    /// in arrival order.
    Concurrent {
        #[serde(rename = "maxInFlight", default = "default_max_in_flight")]
        max_in_flight: usize,
    },
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

/// Configuration supplied at hub construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Ordered allow-list. Empty denies every request.
    pub permissions: Vec<PermissionRule>,
    pub dispatch: DispatchMode,
}

impl HubConfig {
    pub fn new(permissions: Vec<PermissionRule>) -> Self {
        Self {
            permissions,
            dispatch: DispatchMode::Sequential,
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        serde_json::from_str(json).map_err(|e| PatternError::InvalidConfig(e.to_string()))
    }

    pub fn matcher(&self) -> PermissionMatcher {
        PermissionMatcher::new(self.permissions.clone())
    }
}
