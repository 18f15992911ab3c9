//! Concrete realtime transport over a streaming HTTP response.

pub mod stream;

pub use stream::{HttpStreamTransport, StreamConfig};
