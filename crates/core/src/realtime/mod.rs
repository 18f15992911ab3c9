//! Realtime synchronization: event normalization and routing.
//!
//! Three asynchronous channels deliver meeting-request updates: the
//! socket-style realtime connection, push notifications, and
//! focus-triggered polls. This module owns the connection lifecycle and
//! folds all three into the normalized [`momentum_domain::RealtimeEvent`]
//! stream consumed by the request store.

pub mod backoff;
pub mod ports;
pub mod router;
pub mod wire;
