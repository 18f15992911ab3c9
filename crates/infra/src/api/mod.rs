//! REST adapter for the moment-requests backend.

pub mod moments;

pub use moments::{MomentsApiClient, MomentsApiConfig};
