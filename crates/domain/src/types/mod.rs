//! Domain types and models
//!
//! The meeting request record and the value types derived from it. The
//! backend owns every `MeetingRequest`; client-side copies live in an
//! eventually consistent cache and may be briefly stale or briefly ahead
//! of the server.

pub mod interval;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use interval::Interval;

/// Lifecycle status of a meeting request.
///
/// Transitions are monotonic: `pending` may become `approved` or
/// `rejected`, and nothing transitions back to `pending`. Cancellation
/// removes the record entirely instead of setting a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Whether a transition from `self` to `next` respects monotonicity.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        match self {
            RequestStatus::Pending => true,
            RequestStatus::Approved | RequestStatus::Rejected => *self == next,
        }
    }
}

/// A proposed or confirmed meeting between two parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    /// Opaque identifier, stable for the lifetime of the request.
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: RequestStatus,
    /// Free-form tag describing the kind of meeting (coffee, call, ...).
    pub meeting_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingRequest {
    /// The booked time range of this request.
    pub fn interval(&self) -> Interval {
        Interval { start: self.start_time, end: self.end_time }
    }

    /// Whether the given party is sender or receiver of this request.
    pub fn involves(&self, party_id: &str) -> bool {
        self.sender_id == party_id || self.receiver_id == party_id
    }
}

/// The normalized event kind shared by all three update channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealtimeEventKind {
    Created,
    Approved,
    Rejected,
    Canceled,
}

impl RealtimeEventKind {
    /// The status carried by a response event, if any.
    pub fn status(&self) -> Option<RequestStatus> {
        match self {
            RealtimeEventKind::Approved => Some(RequestStatus::Approved),
            RealtimeEventKind::Rejected => Some(RequestStatus::Rejected),
            RealtimeEventKind::Created | RealtimeEventKind::Canceled => None,
        }
    }
}

/// A meeting-request update, decoded once at the channel boundary.
///
/// Socket events, push notifications and poll results all normalize to
/// this shape; downstream consumers cannot tell the origin channel apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    pub kind: RealtimeEventKind,
    pub request_id: String,
    /// Start-time hint from push payloads, used to pick the day view to
    /// open. Absent on socket events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

/// A meeting the user is actively composing. Exists only in UI state:
/// never persisted, never placed in the request store, and excluded from
/// conflict checks against itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDraft {
    pub draft_id: Uuid,
    pub receiver_id: String,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
    pub title: String,
    pub notes: Option<String>,
    pub meeting_type: String,
}

impl PendingDraft {
    pub fn new(
        receiver_id: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
        title: impl Into<String>,
        meeting_type: impl Into<String>,
    ) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            receiver_id: receiver_id.into(),
            start_time,
            duration,
            title: title.into(),
            notes: None,
            meeting_type: meeting_type.into(),
        }
    }

    /// The time range this draft would occupy once submitted.
    pub fn interval(&self) -> crate::errors::Result<Interval> {
        Interval::from_start_duration(self.start_time, self.duration)
    }
}
