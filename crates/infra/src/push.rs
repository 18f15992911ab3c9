//! Push-notification gateway.
//!
//! Foreground notifications carry a data payload with the same logical
//! events as the socket channel. The gateway decodes the raw payload and
//! hands it to the router, which applies it with the usual optimistic
//! patch plus delayed reconcile. Tapped notifications additionally yield
//! a day hint so the host can open the right day view.

use chrono::NaiveDate;
use momentum_core::{PushPayload, RealtimeRouter};
use momentum_domain::{MomentumError, Result};
use tracing::{debug, instrument};

/// Entry point for push notifications delivered by the host platform.
pub struct PushGateway {
    router: RealtimeRouter,
}

impl PushGateway {
    pub fn new(router: RealtimeRouter) -> Self {
        Self { router }
    }

    /// Apply the data payload of a notification received while the app
    /// is in the foreground.
    #[instrument(skip(self, raw))]
    pub fn handle_foreground(&self, raw: &str) -> Result<()> {
        let payload = decode(raw)?;
        debug!(event_type = %payload.event_type, "applying push notification");
        self.router.handle_push(payload);
        Ok(())
    }

    /// Which day view to open when the user taps a notification. `None`
    /// when the payload carries no start time.
    pub fn day_hint(raw: &str) -> Result<Option<NaiveDate>> {
        let payload = decode(raw)?;
        Ok(payload.start_time.map(|t| t.date_naive()))
    }
}

fn decode(raw: &str) -> Result<PushPayload> {
    serde_json::from_str(raw)
        .map_err(|e| MomentumError::InvalidInput(format!("undecodable push payload: {e}")))
}
