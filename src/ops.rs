use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Local, MappedLocalTime, NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Half-open time interval.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Local>,

    /// Exclusive.
    pub end: DateTime<Local>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    /// Interval of the given length starting at `start`.
    pub fn starting_at(start: DateTime<Local>, len: TimeDelta) -> Self {
        Self { start, end: start + len }
    }

    #[must_use]
    pub fn len(self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(self, other: DateTime<Local>) -> bool {
        (self.start <= other) && (other < self.end)
    }

    /// Whether the other interval lies entirely within this one.
    #[must_use]
    pub fn covers(self, other: Self) -> bool {
        (self.start <= other.start) && (other.end <= self.end)
    }

    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        (self.start < other.end) && (other.start < self.end)
    }
}

/// Resolve the local wall-clock time, taking the earlier instant when it is ambiguous.
#[must_use]
pub fn at_local(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Local>> {
    match date.and_time(time).and_local_timezone(Local) {
        MappedLocalTime::Single(instant) | MappedLocalTime::Ambiguous(instant, _) => Some(instant),
        MappedLocalTime::None => None,
    }
}

/// Local midnight of the instant's date.
#[must_use]
pub fn start_of_day(instant: DateTime<Local>) -> DateTime<Local> {
    at_local(instant.date_naive(), NaiveTime::MIN)
        .unwrap_or_else(|| instant - (instant.time() - NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 9, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_contains_is_half_open() {
        let interval = Interval::new(at(10, 0), at(11, 0));
        assert!(interval.contains(at(10, 0)));
        assert!(interval.contains(at(10, 59)));
        assert!(!interval.contains(at(11, 0)));
    }

    #[test]
    fn test_covers() {
        let hour = Interval::new(at(10, 0), at(11, 0));
        assert!(hour.covers(Interval::new(at(10, 48), at(11, 0))));
        assert!(hour.covers(hour));
        assert!(!hour.covers(Interval::new(at(10, 48), at(11, 12))));
    }

    #[test]
    fn test_overlaps() {
        let hour = Interval::new(at(10, 0), at(11, 0));
        assert!(hour.overlaps(Interval::new(at(10, 30), at(11, 30))));
        assert!(hour.overlaps(Interval::new(at(9, 0), at(12, 0))));
        assert!(!hour.overlaps(Interval::new(at(11, 0), at(12, 0))));
    }

    #[test]
    fn test_start_of_day() {
        assert_eq!(start_of_day(at(10, 48)), at(0, 0));
        assert_eq!(start_of_day(at(0, 0)), at(0, 0));
    }
}
