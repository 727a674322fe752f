//! # Runtime Configuration
//!
//! Loaded from an optional JSON file named by `XS_CONFIG`, then overridden
//! by environment variables:
//!
//! | Variable                | Field                    |
//! |-------------------------|--------------------------|
//! | `XS_LOG_LEVEL`          | `logging.level`          |
//! | `XS_JSON_LOGS`          | `logging.json`           |
//! | `XS_HUB_ORIGIN`         | `hubOrigin`              |
//! | `XS_CLIENT_ORIGIN`      | `clientOrigin`           |
//! | `XS_REQUEST_TIMEOUT_MS` | `requestTimeoutMs` (0 disables) |
//! | `XS_PURGE_INTERVAL_MS`  | `purgeIntervalMs` (0 disables)  |

use serde::{Deserialize, Serialize};
use shared_types::Origin;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use xs_01_permission_matcher::PermissionRule;
use xs_03_hub::HubConfig;
use xs_04_client::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};

pub const CONFIG_PATH_VAR: &str = "XS_CONFIG";

const DEFAULT_HUB_ORIGIN: &str = "https://hub.localhost";
const DEFAULT_CLIENT_ORIGIN: &str = "https://app.localhost";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Hub permission list is empty: every request would be denied")]
    NoPermissions,

    #[error("Client and hub share origin {0}")]
    SameOrigin(Origin),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub logging: LoggingConfig,
    pub hub_origin: Origin,
    pub client_origin: Origin,
    /// Per-call deadline on the client. `None` waits forever.
    pub request_timeout_ms: Option<u64>,
    /// Period of the expired-entry sweep. `None` relies on lazy expiry only.
    pub purge_interval_ms: Option<u64>,
    pub hub: HubConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let hub = match PermissionRule::allow_all(DEFAULT_CLIENT_ORIGIN) {
            Ok(rule) => HubConfig::new(vec![rule]),
            Err(_) => HubConfig::default(),
        };
        Self {
            logging: LoggingConfig::default(),
            hub_origin: Origin::new(DEFAULT_HUB_ORIGIN),
            client_origin: Origin::new(DEFAULT_CLIENT_ORIGIN),
            request_timeout_ms: u64::try_from(DEFAULT_REQUEST_TIMEOUT.as_millis()).ok(),
            purge_interval_ms: None,
            hub,
        }
    }
}

impl RuntimeConfig {
    /// Load from `XS_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(level) = lookup("XS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("XS_JSON_LOGS") {
            self.logging.json = parse_bool("XS_JSON_LOGS", &json)?;
        }
        if let Some(origin) = lookup("XS_HUB_ORIGIN") {
            self.hub_origin = Origin::new(origin);
        }
        if let Some(origin) = lookup("XS_CLIENT_ORIGIN") {
            self.client_origin = Origin::new(origin);
        }
        if let Some(ms) = lookup("XS_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_millis("XS_REQUEST_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("XS_PURGE_INTERVAL_MS") {
            self.purge_interval_ms = parse_millis("XS_PURGE_INTERVAL_MS", &ms)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.permissions.is_empty() {
            return Err(ConfigError::NoPermissions);
        }
        if self.hub_origin == self.client_origin {
            return Err(ConfigError::SameOrigin(self.hub_origin.clone()));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.hub_origin.clone())
            .with_request_timeout(self.request_timeout_ms.map(Duration::from_millis))
    }

    pub fn purge_interval(&self) -> Option<Duration> {
        self.purge_interval_ms.map(Duration::from_millis)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}

/// `0` means disabled.
fn parse_millis(var: &'static str, value: &str) -> Result<Option<u64>, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Ok(None),
        Ok(ms) => Ok(Some(ms)),
        Err(_) => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        }),
    }
}
