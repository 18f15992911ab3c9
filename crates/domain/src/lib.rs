//! # Momentum Domain
//!
//! Business domain types and models for the Momentum client.
//!
//! This crate contains:
//! - Domain data types (MeetingRequest, Interval, RealtimeEvent, etc.)
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Momentum crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures, no I/O

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{MomentumError, Result};
pub use types::interval::Interval;
pub use types::{MeetingRequest, PendingDraft, RealtimeEvent, RealtimeEventKind, RequestStatus};
