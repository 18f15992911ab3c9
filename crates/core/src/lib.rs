//! # Momentum Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Availability calculation over booked intervals
//! - The in-memory meeting-request cache
//! - Client-side conflict checking
//! - The realtime event router that reconciles socket, push and poll
//!   updates into one consistent view
//!
//! ## Architecture Principles
//! - Only depends on `momentum-domain`
//! - No HTTP or transport code; external collaborators via traits
//! - Pure, testable business logic

pub mod availability;
pub mod conflict;
pub mod realtime;
pub mod service;
pub mod store;

// Re-export specific items to avoid ambiguity
pub use availability::{busy_for_party, free_gaps};
pub use conflict::would_conflict;
pub use realtime::ports::{AvatarLookup, CredentialProvider, MomentRequestApi, RealtimeTransport};
pub use realtime::router::{ConnectionState, EventSubscription, RealtimeRouter, RouterConfig};
pub use realtime::wire::{PushPayload, WireEvent};
pub use service::MomentService;
pub use store::RequestStore;
