//! # Origin
//!
//! Identity of an execution context as seen by the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport-verified identity of a calling context.
///
/// Equivalent to a web origin (`scheme://host[:port]`). Any string is accepted
/// since the transport decides what an origin looks like; values are
/// normalized to lowercase so comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Origin(String);

/// Decomposed `scheme://host[:port]` form of an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginParts<'a> {
    pub scheme: &'a str,
    pub host: &'a str,
    pub port: Option<u16>,
}

impl Origin {
    pub fn new(origin: impl Into<String>) -> Self {
        let mut raw: String = origin.into();
        raw.make_ascii_lowercase();
        let trimmed_len = raw.trim_end_matches('/').len();
        raw.truncate(trimmed_len);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into scheme, host and port.
    ///
    /// Returns `None` when the origin is not of the `scheme://host[:port]`
    /// shape, e.g. an opaque identifier chosen by a custom transport.
    pub fn parts(&self) -> Option<OriginParts<'_>> {
        let (scheme, rest) = self.0.split_once("://")?;
        if scheme.is_empty() || rest.is_empty() || rest.contains('/') {
            return None;
        }

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => (host, Some(port.parse::<u16>().ok()?)),
            None => (rest, None),
        };

        if host.is_empty() {
            return None;
        }

        Some(OriginParts { scheme, host, port })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Origin {
    fn from(origin: &str) -> Self {
        Self::new(origin)
    }
}

impl From<String> for Origin {
    fn from(origin: String) -> Self {
        Self::new(origin)
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.0
    }
}

impl AsRef<str> for Origin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
