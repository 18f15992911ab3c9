//! In-memory, per-session cache of meeting requests.
//!
//! The backend is the source of truth; this store holds an eventually
//! consistent copy. Realtime events apply optimistic patches that a
//! delayed authoritative refetch (`replace_all`) later confirms or
//! corrects. Every operation is idempotent, so redundant delivery of the
//! same logical event across channels cannot corrupt state.

use std::collections::HashMap;

use momentum_domain::{MeetingRequest, RequestStatus};
use parking_lot::RwLock;
use tracing::debug;

/// Meeting-request cache keyed by request id.
#[derive(Debug, Default)]
pub struct RequestStore {
    requests: RwLock<HashMap<String, MeetingRequest>>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace a record by id.
    pub fn upsert(&self, request: MeetingRequest) {
        self.requests.write().insert(request.id.clone(), request);
    }

    /// Optimistically update only the status of a known record.
    ///
    /// Returns `false` without touching the store when the id is unknown;
    /// events may reference records that only arrive with the next poll.
    /// Status regressions (`approved`/`rejected` back to `pending`) are
    /// refused the same way.
    pub fn patch_status(&self, id: &str, status: RequestStatus) -> bool {
        let mut requests = self.requests.write();
        match requests.get_mut(id) {
            Some(request) if request.status.can_transition_to(status) => {
                request.status = status;
                true
            }
            Some(request) => {
                debug!(id, from = ?request.status, to = ?status, "ignoring non-monotonic status patch");
                false
            }
            None => false,
        }
    }

    /// Remove a record. Removing an absent id is a no-op.
    pub fn remove(&self, id: &str) {
        self.requests.write().remove(id);
    }

    /// Replace the entire cached set with an authoritative snapshot.
    pub fn replace_all(&self, requests: Vec<MeetingRequest>) {
        let mut map = self.requests.write();
        map.clear();
        map.extend(requests.into_iter().map(|r| (r.id.clone(), r)));
    }

    pub fn get(&self, id: &str) -> Option<MeetingRequest> {
        self.requests.read().get(id).cloned()
    }

    /// Read-only filtered view of the cached records.
    pub fn query<P>(&self, predicate: P) -> Vec<MeetingRequest>
    where
        P: Fn(&MeetingRequest) -> bool,
    {
        self.requests.read().values().filter(|r| predicate(r)).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.requests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.read().is_empty()
    }
}
