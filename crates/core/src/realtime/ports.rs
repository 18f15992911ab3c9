//! Port interfaces for the realtime sync core.
//!
//! Infrastructure adapters (HTTP, streaming transport, device lookups)
//! implement these traits; tests substitute fakes.

use async_trait::async_trait;
use momentum_domain::{MeetingRequest, PendingDraft, Result};
use tokio::sync::mpsc;

use super::wire::WireEvent;

/// The socket-style realtime channel.
///
/// A successful connect hands back the receiving half of the event
/// stream; the channel closing signals a transport drop. Each call
/// establishes a fresh subscription, so reconnecting through `connect`
/// also re-registers the transport-level listeners.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn connect(&self, bearer_token: &str) -> Result<mpsc::Receiver<WireEvent>>;
}

/// The REST backend for meeting requests.
#[async_trait]
pub trait MomentRequestApi: Send + Sync {
    /// Authoritative snapshot of all requests visible to this user
    /// (sent and received). Supersedes any optimistic local state.
    async fn fetch_requests(&self) -> Result<Vec<MeetingRequest>>;

    /// Create a request from a composed draft. Starts `pending`.
    async fn create_request(&self, draft: &PendingDraft) -> Result<MeetingRequest>;

    /// Accept or decline a received request.
    async fn respond(&self, id: &str, approved: bool) -> Result<()>;

    /// Cancel a request; the record disappears rather than changing status.
    async fn cancel(&self, id: &str) -> Result<()>;

    /// Grant the given user visibility into our calendar.
    async fn grant_visibility(&self, user_id: &str) -> Result<()>;
}

/// Synchronous access to the login credential.
///
/// The credential is persisted by an external collaborator; its absence
/// means "do not connect", never an error.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Device-local contact lookup used for avatar matching.
///
/// Pure and side-effect free: maps a hashed phone number to an avatar
/// URI when the contact is known on this device.
pub trait AvatarLookup: Send + Sync {
    fn avatar_for(&self, phone_hash: &str) -> Option<String>;
}
