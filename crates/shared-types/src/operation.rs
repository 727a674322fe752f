//! # Operations
//!
//! The closed set of store operations a client may request from a hub.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A store operation carried in a request envelope.
///
/// Wire names follow the `camelCase` convention of the channel; the legacy
/// spellings `del` and `getKeys` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "get")]
    Get,
    #[serde(rename = "set")]
    Set,
    #[serde(rename = "delete", alias = "del")]
    Delete,
    #[serde(rename = "getAllKeys", alias = "getKeys")]
    GetAllKeys,
    #[serde(rename = "clear")]
    Clear,
}

impl Operation {
    /// Every operation, in wire declaration order.
    pub const ALL: [Operation; 5] = [
        Operation::Get,
        Operation::Set,
        Operation::Delete,
        Operation::GetAllKeys,
        Operation::Clear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::GetAllKeys => "getAllKeys",
            Operation::Clear => "clear",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operation name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Operation::Get),
            "set" => Ok(Operation::Set),
            "delete" | "del" => Ok(Operation::Delete),
            "getAllKeys" | "getKeys" => Ok(Operation::GetAllKeys),
            "clear" => Ok(Operation::Clear),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}
