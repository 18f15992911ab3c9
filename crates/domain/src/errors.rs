//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Momentum
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MomentumError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Realtime transport error: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The proposed time overlaps an existing committed or pending meeting.
    #[error("Scheduling conflict: {0}")]
    Conflict(String),

    /// The counterparty has no calendar registered. Recognized server
    /// condition; actionable on the submission path, ignorable elsewhere.
    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MomentumError {
    /// Whether the error blocks a user-initiated action or can be
    /// swallowed by a background refresh.
    pub fn is_background_tolerable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Transport(_) | Self::NotFound(_))
    }
}

/// Result type alias for Momentum operations
pub type Result<T> = std::result::Result<T, MomentumError>;
