use shared_bus::TransportError;
use thiserror::Error;

/// Hub lifecycle errors.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Hub is already listening")]
    AlreadyListening,

    #[error("Hub is not listening")]
    NotListening,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
