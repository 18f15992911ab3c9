//! Half-open time intervals and the merge/overlap algebra built on them.
//!
//! Intervals carry no identity and are compared by value. All instants are
//! UTC; callers normalize timezone and day boundaries before entering this
//! module.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MomentumError, Result};

/// A half-open time range `[start, end)`. `end` is strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(MomentumError::InvalidInput(format!(
                "interval end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create an interval from a start instant and a positive duration.
    pub fn from_start_duration(start: DateTime<Utc>, duration: Duration) -> Result<Self> {
        Self::new(start, start + duration)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when the intervals touch end-to-start without overlapping.
    pub fn adjacent(&self, other: &Interval) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// Union span of two overlapping or adjacent intervals.
    /// Returns `None` when the intervals are disjoint.
    pub fn merge(&self, other: &Interval) -> Option<Interval> {
        if !self.overlaps(other) && !self.adjacent(other) {
            return None;
        }
        Some(Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }

    /// Clamp this interval to a window, returning `None` when nothing is left.
    pub fn clamp_to(&self, window: &Interval) -> Option<Interval> {
        let start = self.start.max(window.start);
        let end = self.end.min(window.end);
        if end <= start {
            return None;
        }
        Some(Interval { start, end })
    }
}

/// Fold a set of intervals into the minimal sorted sequence.
///
/// The output is sorted by start, pairwise non-overlapping and non-touching,
/// and covers exactly the union of the input.
pub fn merge_all(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by_key(|iv| iv.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(last) => match last.merge(&iv) {
                Some(joined) => *last = joined,
                None => merged.push(iv),
            },
            None => merged.push(iv),
        }
    }
    merged
}
