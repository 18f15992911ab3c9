//! User-action surface for meeting requests.
//!
//! Screens call this service; it combines the advisory conflict check,
//! the REST backend and the optimistic store mutations that keep the UI
//! responsive until the next authoritative refetch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use momentum_domain::{
    Interval, MeetingRequest, MomentumError, PendingDraft, RequestStatus, Result,
};
use tracing::{debug, instrument};

use crate::availability::{busy_for_party, free_gaps};
use crate::conflict::would_conflict;
use crate::realtime::ports::MomentRequestApi;
use crate::store::RequestStore;

/// Meeting-request operations on behalf of the signed-in user.
pub struct MomentService {
    api: Arc<dyn MomentRequestApi>,
    store: Arc<RequestStore>,
    user_id: String,
}

impl MomentService {
    pub fn new(api: Arc<dyn MomentRequestApi>, store: Arc<RequestStore>, user_id: impl Into<String>) -> Self {
        Self { api, store, user_id: user_id.into() }
    }

    /// Submit a composed draft as a new meeting request.
    ///
    /// The advisory pre-check runs against both parties' cached same-day
    /// bookings; the draft itself lives outside the store and cannot
    /// collide with itself. The backend stays the final arbiter - a
    /// server-detected race comes back as a plain error, not a bug.
    #[instrument(skip(self, draft), fields(receiver = %draft.receiver_id))]
    pub async fn create_request(&self, draft: &PendingDraft) -> Result<MeetingRequest> {
        let mine = self.store.query(|r| r.involves(&self.user_id));
        let theirs = self.store.query(|r| r.involves(&draft.receiver_id));
        if would_conflict(draft.start_time, draft.duration, &mine, &theirs) {
            return Err(MomentumError::Conflict(format!(
                "proposed time {} overlaps an existing meeting",
                draft.start_time
            )));
        }

        let created = self.api.create_request(draft).await?;
        self.store.upsert(created.clone());
        Ok(created)
    }

    /// Accept or decline a received request, patching the cache
    /// optimistically once the backend confirms.
    #[instrument(skip(self))]
    pub async fn respond(&self, id: &str, approved: bool) -> Result<()> {
        self.api.respond(id, approved).await?;
        let status = if approved { RequestStatus::Approved } else { RequestStatus::Rejected };
        if !self.store.patch_status(id, status) {
            debug!(id, "responded to a request not present in the cache");
        }
        Ok(())
    }

    /// Cancel a request; the record disappears locally right away.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: &str) -> Result<()> {
        self.api.cancel(id).await?;
        self.store.remove(id);
        Ok(())
    }

    /// Grant a user visibility into our calendar. "Already granted" is
    /// mapped to success by the API adapter; "calendar not found"
    /// propagates because the submission path must surface it.
    pub async fn grant_visibility(&self, user_id: &str) -> Result<()> {
        self.api.grant_visibility(user_id).await
    }

    /// Free intervals for one party within a day window, computed from
    /// the cached committed-or-pending bookings. The two-party view is
    /// two calls to this with different party ids.
    pub fn availability_for(
        &self,
        party_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Vec<Interval> {
        let requests = self.store.query(|r| r.involves(party_id));
        let busy = busy_for_party(&requests, party_id, day_start.date_naive());
        free_gaps(&busy, day_start, day_end)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use parking_lot::Mutex;

    use super::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, hour, min, 0).unwrap()
    }

    fn booked(id: &str, sender: &str, receiver: &str, start: DateTime<Utc>) -> MeetingRequest {
        MeetingRequest {
            id: id.to_string(),
            sender_id: sender.to_string(),
            receiver_id: receiver.to_string(),
            start_time: start,
            end_time: start + Duration::minutes(30),
            title: "Meet".to_string(),
            notes: None,
            status: RequestStatus::Approved,
            meeting_type: "call".to_string(),
            created_at: start,
            updated_at: start,
        }
    }

    #[derive(Default)]
    struct RecordingApi {
        create_count: AtomicU32,
        responses: Mutex<Vec<(String, bool)>>,
        cancels: Mutex<Vec<String>>,
        fail_create_with: Mutex<Option<MomentumError>>,
    }

    #[async_trait]
    impl MomentRequestApi for RecordingApi {
        async fn fetch_requests(&self) -> Result<Vec<MeetingRequest>> {
            Ok(Vec::new())
        }

        async fn create_request(&self, draft: &PendingDraft) -> Result<MeetingRequest> {
            if let Some(err) = self.fail_create_with.lock().take() {
                return Err(err);
            }
            self.create_count.fetch_add(1, Ordering::SeqCst);
            Ok(MeetingRequest {
                id: "server-id-1".to_string(),
                sender_id: "alice".to_string(),
                receiver_id: draft.receiver_id.clone(),
                start_time: draft.start_time,
                end_time: draft.start_time + draft.duration,
                title: draft.title.clone(),
                notes: draft.notes.clone(),
                status: RequestStatus::Pending,
                meeting_type: draft.meeting_type.clone(),
                created_at: draft.start_time,
                updated_at: draft.start_time,
            })
        }

        async fn respond(&self, id: &str, approved: bool) -> Result<()> {
            self.responses.lock().push((id.to_string(), approved));
            Ok(())
        }

        async fn cancel(&self, id: &str) -> Result<()> {
            self.cancels.lock().push(id.to_string());
            Ok(())
        }

        async fn grant_visibility(&self, user_id: &str) -> Result<()> {
            if user_id == "no-calendar" {
                return Err(MomentumError::CalendarNotFound(user_id.to_string()));
            }
            Ok(())
        }
    }

    fn service() -> (MomentService, Arc<RecordingApi>, Arc<RequestStore>) {
        let api = Arc::new(RecordingApi::default());
        let store = Arc::new(RequestStore::new());
        let svc = MomentService::new(
            Arc::clone(&api) as Arc<dyn MomentRequestApi>,
            Arc::clone(&store),
            "alice",
        );
        (svc, api, store)
    }

    fn draft_at(start: DateTime<Utc>) -> PendingDraft {
        PendingDraft::new("bob", start, Duration::minutes(30), "Coffee", "coffee")
    }

    #[tokio::test]
    async fn create_submits_and_caches_the_pending_request() {
        let (svc, api, store) = service();

        let created = svc.create_request(&draft_at(at(14, 0))).await.unwrap();

        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(api.create_count.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("server-id-1").unwrap().title, "Coffee");
    }

    #[tokio::test]
    async fn create_is_blocked_by_a_same_day_conflict_without_calling_the_api() {
        let (svc, api, store) = service();
        store.upsert(booked("r1", "carol", "alice", at(14, 15)));

        let err = svc.create_request(&draft_at(at(14, 0))).await.unwrap_err();

        assert!(matches!(err, MomentumError::Conflict(_)));
        assert_eq!(api.create_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_considers_the_counterparty_calendar_too() {
        let (svc, api, store) = service();
        store.upsert(booked("r1", "bob", "dave", at(14, 0)));

        let err = svc.create_request(&draft_at(at(14, 15))).await.unwrap_err();
        assert!(matches!(err, MomentumError::Conflict(_)));
        assert_eq!(api.create_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_conflict_propagates_as_a_normal_error() {
        let (svc, api, store) = service();
        *api.fail_create_with.lock() =
            Some(MomentumError::Conflict("server detected a race".to_string()));

        let err = svc.create_request(&draft_at(at(9, 0))).await.unwrap_err();
        assert!(matches!(err, MomentumError::Conflict(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn respond_patches_the_cached_status() {
        let (svc, api, store) = service();
        let mut pending = booked("r1", "carol", "alice", at(10, 0));
        pending.status = RequestStatus::Pending;
        store.upsert(pending);

        svc.respond("r1", true).await.unwrap();

        assert_eq!(store.get("r1").unwrap().status, RequestStatus::Approved);
        assert_eq!(api.responses.lock().as_slice(), &[("r1".to_string(), true)]);
    }

    #[tokio::test]
    async fn respond_tolerates_an_uncached_request() {
        let (svc, _api, store) = service();
        svc.respond("unknown", false).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn cancel_removes_the_cached_record() {
        let (svc, api, store) = service();
        store.upsert(booked("r1", "alice", "bob", at(10, 0)));

        svc.cancel("r1").await.unwrap();

        assert!(store.get("r1").is_none());
        assert_eq!(api.cancels.lock().as_slice(), &["r1".to_string()]);
    }

    #[tokio::test]
    async fn grant_visibility_surfaces_missing_calendar() {
        let (svc, _api, _store) = service();
        assert!(svc.grant_visibility("bob").await.is_ok());
        let err = svc.grant_visibility("no-calendar").await.unwrap_err();
        assert!(matches!(err, MomentumError::CalendarNotFound(_)));
    }

    #[tokio::test]
    async fn availability_reflects_cached_bookings() {
        let (svc, _api, store) = service();
        store.upsert(booked("r1", "alice", "bob", at(9, 0)));

        let gaps = svc.availability_for("alice", at(8, 0), at(12, 0));

        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].end, at(9, 0));
        assert_eq!(gaps[1].start, at(9, 30));
    }
}
