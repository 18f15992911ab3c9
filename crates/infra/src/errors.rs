//! Infrastructure error types and their mapping into the domain error.

use thiserror::Error;

use momentum_domain::MomentumError;

/// Errors raised by infrastructure adapters before domain mapping.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<InfraError> for MomentumError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Http(e) => MomentumError::Network(format!("http request failed: {e}")),
            InfraError::Decode(e) => MomentumError::Internal(format!("response decode failed: {e}")),
            InfraError::Config(msg) => MomentumError::Config(msg),
            InfraError::Transport(msg) => MomentumError::Transport(msg),
        }
    }
}
