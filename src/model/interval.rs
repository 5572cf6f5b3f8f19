//! Activity intervals: one timed, classified unit of work.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClassificationPath, lenient};

/// One classified unit of work within a session.
///
/// Timestamps are optional here because frozen and imported records are read
/// leniently. The live timeline always sets `start_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInterval {
    pub id: Uuid,

    /// What the worker was doing, as typed by the observer.
    pub text: String,

    pub classification: ClassificationPath,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub start_at: Option<Timestamp>,

    /// Absent while the interval is open.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub end_at: Option<Timestamp>,
}

impl ActivityInterval {
    /// Elapsed milliseconds, or `None` if either timestamp is missing.
    ///
    /// A negative span (end before start) clamps to zero.
    pub fn duration_ms(&self) -> Option<u64> {
        let (start, end) = (self.start_at?, self.end_at?);
        let span = end.as_millisecond() - start.as_millisecond();
        Some(u64::try_from(span).unwrap_or(0))
    }

    /// Elapsed milliseconds, counting incomplete intervals as zero.
    pub fn elapsed_ms(&self) -> u64 {
        self.duration_ms().unwrap_or(0)
    }

    pub fn is_open(&self) -> bool {
        self.end_at.is_none()
    }
}

/// Sum of elapsed time over a sequence of intervals.
pub fn total_ms(intervals: &[ActivityInterval]) -> u64 {
    intervals.iter().map(ActivityInterval::elapsed_ms).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start_ms: Option<i64>, end_ms: Option<i64>) -> ActivityInterval {
        ActivityInterval {
            id: Uuid::new_v4(),
            text: "Apertar flange".into(),
            classification: ClassificationPath::default(),
            start_at: start_ms.map(|ms| Timestamp::from_millisecond(ms).unwrap()),
            end_at: end_ms.map(|ms| Timestamp::from_millisecond(ms).unwrap()),
        }
    }

    #[test]
    fn closed_interval_duration() {
        let i = interval(Some(1_000_000), Some(1_005_000));
        assert_eq!(i.duration_ms(), Some(5000));
        assert!(!i.is_open());
    }

    #[test]
    fn negative_span_clamps_to_zero() {
        let i = interval(Some(1_005_000), Some(1_000_000));
        assert_eq!(i.duration_ms(), Some(0));
    }

    #[test]
    fn missing_timestamp_has_no_duration() {
        assert_eq!(interval(Some(1_000_000), None).duration_ms(), None);
        assert_eq!(interval(None, Some(1_000_000)).duration_ms(), None);
        assert_eq!(interval(None, None).elapsed_ms(), 0);
    }

    #[test]
    fn total_skips_incomplete_intervals() {
        let intervals = [
            interval(Some(0), Some(2000)),
            interval(Some(2000), None),
            interval(Some(5000), Some(8000)),
        ];
        assert_eq!(total_ms(&intervals), 5000);
    }
}
