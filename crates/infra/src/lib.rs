//! # Momentum Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The retrying HTTP client and the moment-requests API adapter
//! - The streaming realtime transport
//! - The push-notification gateway
//! - The device-contact avatar index
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `momentum-core`
//! - Contains all "impure" code (network I/O, environment access)

pub mod api;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod errors;
pub mod http;
pub mod push;
pub mod realtime;

// Re-export commonly used items
pub use api::MomentsApiClient;
pub use auth::SessionCredentials;
pub use config::MomentumConfig;
pub use contacts::DeviceContacts;
pub use errors::InfraError;
pub use http::HttpClient;
pub use push::PushGateway;
pub use realtime::HttpStreamTransport;
