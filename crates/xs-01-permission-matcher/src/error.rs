//! Error types for permission configuration

use thiserror::Error;

/// Errors raised while building permission rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Origin pattern is empty")]
    Empty,

    #[error("Wildcard must be the leading host label: {0}")]
    MisplacedWildcard(String),

    #[error("Wildcard pattern has no domain after '*.': {0}")]
    EmptySuffix(String),

    #[error("Invalid port in origin pattern: {0}")]
    InvalidPort(String),

    #[error("Unknown operation in allow list: {0}")]
    UnknownOperation(String),

    #[error("Invalid permission configuration: {0}")]
    InvalidConfig(String),
}
