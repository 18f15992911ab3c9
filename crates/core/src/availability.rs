//! Free/busy gap computation for a bounded day window.
//!
//! The side-by-side two-party view is two independent calls to
//! [`free_gaps`]; there is no cross-party coupling here.

use chrono::{DateTime, NaiveDate, Utc};
use momentum_domain::types::interval::merge_all;
use momentum_domain::{Interval, MeetingRequest};

/// Compute the ordered free intervals within `[day_start, day_end)` left
/// over by the union of `busy`.
///
/// The busy set may be raw; it is merged first. Zero-length gaps between
/// adjacent busy intervals are omitted, and busy time outside the window
/// is clamped away. An empty busy set yields the whole window as one gap.
pub fn free_gaps(
    busy: &[Interval],
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
) -> Vec<Interval> {
    let Ok(window) = Interval::new(day_start, day_end) else {
        return Vec::new();
    };

    let merged: Vec<Interval> =
        merge_all(busy).iter().filter_map(|iv| iv.clamp_to(&window)).collect();

    let mut gaps = Vec::with_capacity(merged.len() + 1);
    let mut cursor = window.start;
    for iv in &merged {
        if cursor < iv.start {
            gaps.push(Interval { start: cursor, end: iv.start });
        }
        cursor = iv.end;
    }
    if cursor < window.end {
        gaps.push(Interval { start: cursor, end: window.end });
    }
    gaps
}

/// Collect one party's booked intervals for a single calendar day.
///
/// Both committed (approved) and pending requests block time; rejected
/// requests do not.
pub fn busy_for_party(
    requests: &[MeetingRequest],
    party_id: &str,
    day: NaiveDate,
) -> Vec<Interval> {
    use momentum_domain::RequestStatus;

    requests
        .iter()
        .filter(|r| r.involves(party_id))
        .filter(|r| r.status != RequestStatus::Rejected)
        .filter(|r| r.start_time.date_naive() == day)
        .map(MeetingRequest::interval)
        .collect()
}
