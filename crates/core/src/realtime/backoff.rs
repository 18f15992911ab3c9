//! Reconnect delay policy: exponential backoff with a cap.

use std::time::Duration;

/// Delay schedule applied between connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { initial_delay: Duration::from_millis(500), max_delay: Duration::from_secs(10) }
    }
}

impl ReconnectPolicy {
    /// Delay before retrying after the given failed attempt (0-based):
    /// `initial * 2^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.min(16);
        let unclamped = self.initial_delay.saturating_mul(1u32 << shift);
        unclamped.min(self.max_delay)
    }
}
