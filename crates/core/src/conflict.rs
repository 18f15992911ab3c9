//! Client-side advisory conflict checking for proposed meeting times.
//!
//! The check prevents obviously conflicting submissions in the UI; the
//! backend remains the final arbiter and may still reject a proposal that
//! raced past this check.

use chrono::{DateTime, Duration, Utc};
use momentum_domain::{Interval, MeetingRequest, RequestStatus};

/// Whether a proposed `(start, duration)` overlaps any committed or
/// pending interval of either party on the same calendar day.
///
/// Half-open semantics: a proposal that merely touches an existing
/// booking does not conflict. Entries on other days never conflict.
pub fn would_conflict(
    proposed_start: DateTime<Utc>,
    duration: Duration,
    mine: &[MeetingRequest],
    theirs: &[MeetingRequest],
) -> bool {
    let Ok(proposed) = Interval::from_start_duration(proposed_start, duration) else {
        // A zero or negative duration books nothing and conflicts with nothing.
        return false;
    };
    let day = proposed_start.date_naive();

    mine.iter()
        .chain(theirs.iter())
        .filter(|r| r.status != RequestStatus::Rejected)
        .filter(|r| r.start_time.date_naive() == day)
        .any(|r| r.interval().overlaps(&proposed))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use momentum_domain::PendingDraft;

    use super::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, hour, min, 0).unwrap()
    }

    fn booked(id: &str, start: DateTime<Utc>, minutes: i64, status: RequestStatus) -> MeetingRequest {
        MeetingRequest {
            id: id.to_string(),
            sender_id: "alice".to_string(),
            receiver_id: "bob".to_string(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            title: "Meet".to_string(),
            notes: None,
            status,
            meeting_type: "call".to_string(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn partial_overlap_conflicts() {
        // Proposed 14:00-14:30 against existing 14:15-15:00.
        let existing = vec![booked("r1", at(14, 15), 45, RequestStatus::Approved)];
        assert!(would_conflict(at(14, 0), Duration::minutes(30), &existing, &[]));
    }

    #[test]
    fn touching_interval_does_not_conflict() {
        // Proposed 10:00-10:30 against existing 09:00-10:00.
        let existing = vec![booked("r1", at(9, 0), 60, RequestStatus::Approved)];
        assert!(!would_conflict(at(10, 0), Duration::minutes(30), &existing, &[]));
    }

    #[test]
    fn identical_interval_always_conflicts() {
        let existing = vec![booked("r1", at(14, 0), 30, RequestStatus::Approved)];
        assert!(would_conflict(at(14, 0), Duration::minutes(30), &existing, &[]));
    }

    #[test]
    fn pending_requests_block_time_rejected_do_not() {
        let pending = vec![booked("r1", at(14, 0), 30, RequestStatus::Pending)];
        let rejected = vec![booked("r2", at(14, 0), 30, RequestStatus::Rejected)];

        assert!(would_conflict(at(14, 0), Duration::minutes(30), &pending, &[]));
        assert!(!would_conflict(at(14, 0), Duration::minutes(30), &rejected, &[]));
    }

    #[test]
    fn counterparty_bookings_also_conflict() {
        let theirs = vec![booked("r1", at(14, 0), 30, RequestStatus::Approved)];
        assert!(would_conflict(at(14, 15), Duration::minutes(30), &[], &theirs));
    }

    #[test]
    fn other_day_bookings_never_conflict() {
        let tomorrow = Utc.with_ymd_and_hms(2025, 6, 13, 14, 0, 0).unwrap();
        let existing = vec![booked("r1", tomorrow, 30, RequestStatus::Approved)];
        assert!(!would_conflict(at(14, 0), Duration::minutes(30), &existing, &[]));
    }

    #[test]
    fn proposal_inside_a_free_gap_never_conflicts() {
        let existing = vec![
            booked("r1", at(9, 0), 60, RequestStatus::Approved),
            booked("r2", at(12, 0), 60, RequestStatus::Pending),
        ];
        let gaps = crate::availability::free_gaps(
            &existing.iter().map(MeetingRequest::interval).collect::<Vec<_>>(),
            at(8, 0),
            at(18, 0),
        );

        for gap in gaps {
            assert!(!would_conflict(gap.start, gap.duration(), &existing, &[]));
        }
    }

    #[test]
    fn a_draft_is_not_part_of_the_existing_sets() {
        // Drafts live only in UI state; checking a draft against store
        // contents that cannot contain it must pass on an empty day.
        let draft = PendingDraft::new("bob", at(14, 0), Duration::minutes(30), "Coffee", "coffee");
        assert!(!would_conflict(draft.start_time, draft.duration, &[], &[]));
    }

    #[test]
    fn non_positive_duration_never_conflicts() {
        let existing = vec![booked("r1", at(14, 0), 30, RequestStatus::Approved)];
        assert!(!would_conflict(at(14, 0), Duration::zero(), &existing, &[]));
    }
}
