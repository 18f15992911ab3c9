//! Raw channel payload shapes and their one-time normalization.
//!
//! The socket channel and the push-notification channel deliver the same
//! three logical events in different envelopes. Both are decoded here, at
//! the boundary, into [`RealtimeEvent`]; no downstream code ever touches
//! the raw shapes or their string discriminators.

use chrono::{DateTime, Utc};
use momentum_domain::{MomentumError, RealtimeEvent, RealtimeEventKind, Result};
use serde::{Deserialize, Serialize};

/// A server-to-client event as it arrives on the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum WireEvent {
    /// A new request was created targeting this user.
    #[serde(rename = "moment:request")]
    Request(RequestPayload),

    /// The receiver responded to a request this user sent.
    #[serde(rename = "moment:response")]
    Response(ResponsePayload),

    /// A request involving this user was canceled.
    #[serde(rename = "moment:canceled")]
    Canceled(CanceledPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub moment_request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub event_type: ResponseKind,
    pub moment_request_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanceledPayload {
    pub moment_request_id: String,
}

impl WireEvent {
    /// Normalize into the internal event union.
    pub fn normalize(self) -> RealtimeEvent {
        match self {
            WireEvent::Request(p) => RealtimeEvent {
                kind: RealtimeEventKind::Created,
                request_id: p.moment_request_id,
                start_time: p.start_time,
            },
            WireEvent::Response(p) => RealtimeEvent {
                kind: match p.event_type {
                    ResponseKind::Approved => RealtimeEventKind::Approved,
                    ResponseKind::Rejected => RealtimeEventKind::Rejected,
                },
                request_id: p.moment_request_id,
                start_time: None,
            },
            WireEvent::Canceled(p) => RealtimeEvent {
                kind: RealtimeEventKind::Canceled,
                request_id: p.moment_request_id,
                start_time: None,
            },
        }
    }
}

/// Data fields of a push notification, delivered in the foreground or on
/// tap. Carries the same logical events as the socket channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub event_type: String,
    pub moment_request_id: String,
    /// Used to decide which day view to open on tap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl PushPayload {
    /// Normalize into the internal event union.
    ///
    /// Unknown `eventType` values are rejected so the caller can log and
    /// drop them instead of corrupting the store.
    pub fn normalize(self) -> Result<RealtimeEvent> {
        let kind = match self.event_type.as_str() {
            "moment.request.created" => RealtimeEventKind::Created,
            "moment.request.approved" => RealtimeEventKind::Approved,
            "moment.request.rejected" => RealtimeEventKind::Rejected,
            "moment.request.canceled" => RealtimeEventKind::Canceled,
            other => {
                return Err(MomentumError::InvalidInput(format!(
                    "unknown push event type: {other}"
                )))
            }
        };
        Ok(RealtimeEvent {
            kind,
            request_id: self.moment_request_id,
            start_time: self.start_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_socket_response_event() {
        let raw = serde_json::json!({
            "event": "moment:response",
            "payload": { "eventType": "approved", "momentRequestId": "req-7" }
        });

        let event: WireEvent = serde_json::from_value(raw).unwrap();
        let normalized = event.normalize();
        assert_eq!(normalized.kind, RealtimeEventKind::Approved);
        assert_eq!(normalized.request_id, "req-7");
        assert_eq!(normalized.start_time, None);
    }

    #[test]
    fn decodes_socket_created_and_canceled_events() {
        let created: WireEvent = serde_json::from_value(serde_json::json!({
            "event": "moment:request",
            "payload": { "momentRequestId": "req-1" }
        }))
        .unwrap();
        assert_eq!(created.normalize().kind, RealtimeEventKind::Created);

        let canceled: WireEvent = serde_json::from_value(serde_json::json!({
            "event": "moment:canceled",
            "payload": { "momentRequestId": "req-1" }
        }))
        .unwrap();
        assert_eq!(canceled.normalize().kind, RealtimeEventKind::Canceled);
    }

    #[test]
    fn rejects_unknown_socket_event_names() {
        let raw = serde_json::json!({
            "event": "moment:unknown",
            "payload": { "momentRequestId": "req-1" }
        });
        assert!(serde_json::from_value::<WireEvent>(raw).is_err());
    }

    #[test]
    fn push_payload_normalizes_all_known_kinds() {
        let cases = [
            ("moment.request.created", RealtimeEventKind::Created),
            ("moment.request.approved", RealtimeEventKind::Approved),
            ("moment.request.rejected", RealtimeEventKind::Rejected),
            ("moment.request.canceled", RealtimeEventKind::Canceled),
        ];
        for (event_type, expected) in cases {
            let payload = PushPayload {
                event_type: event_type.to_string(),
                moment_request_id: "req-2".to_string(),
                start_time: None,
            };
            assert_eq!(payload.normalize().unwrap().kind, expected);
        }
    }

    #[test]
    fn push_payload_rejects_unknown_event_type() {
        let payload = PushPayload {
            event_type: "moment.request.rescheduled".to_string(),
            moment_request_id: "req-2".to_string(),
            start_time: None,
        };
        assert!(payload.normalize().is_err());
    }

    #[test]
    fn push_and_socket_events_normalize_to_the_same_shape() {
        let socket = WireEvent::Response(ResponsePayload {
            event_type: ResponseKind::Rejected,
            moment_request_id: "req-9".to_string(),
        })
        .normalize();

        let push = PushPayload {
            event_type: "moment.request.rejected".to_string(),
            moment_request_id: "req-9".to_string(),
            start_time: None,
        }
        .normalize()
        .unwrap();

        assert_eq!(socket, push);
    }

    #[test]
    fn push_payload_keeps_the_day_view_hint() {
        let raw = serde_json::json!({
            "eventType": "moment.request.created",
            "momentRequestId": "req-3",
            "startTime": "2025-06-12T14:00:00Z"
        });
        let payload: PushPayload = serde_json::from_value(raw).unwrap();
        let event = payload.normalize().unwrap();
        assert!(event.start_time.is_some());
    }
}
