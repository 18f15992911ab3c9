//! In-memory session credentials.
//!
//! The bearer token is handed to us by the host application after sign-in
//! and lives only in memory. An absent token means "signed out": consumers
//! treat it as "do not connect", never as an error.

use parking_lot::RwLock;

use momentum_core::realtime::ports::CredentialProvider;

/// Shared holder for the signed-in session's bearer token.
#[derive(Default)]
pub struct SessionCredentials {
    token: RwLock<Option<String>>,
}

impl SessionCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the token for a freshly signed-in session.
    pub fn set_session(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Drop the session on sign-out.
    pub fn clear_session(&self) {
        *self.token.write() = None;
    }

    pub fn has_session(&self) -> bool {
        self.token.read().is_some()
    }
}

impl CredentialProvider for SessionCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
