//! Planning calendar.
//!
//! Defines the inclusive date range a roster covers and the weekday
//! arithmetic used by rotation tracking.
//!
//! # Range Model
//! A [`DateRange`] is closed: both `start` and `end` are scheduled dates.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First scheduled date (inclusive).
    pub start: NaiveDate,
    /// Last scheduled date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range from `start` to `end`, both inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of dates in the range (0 if `end` precedes `start`).
    pub fn len(&self) -> usize {
        let days = (self.end - self.start).num_days();
        if days < 0 {
            0
        } else {
            days as usize + 1
        }
    }

    /// Whether the range contains no dates.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Whether a date falls within the range.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterates all dates in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Whether `weekday` occurs on any date in `(after, up_to]`.
///
/// Returns `false` when `up_to` is not after `after`.
pub fn weekday_between(after: NaiveDate, up_to: NaiveDate, weekday: Weekday) -> bool {
    let gap = (up_to - after).num_days();
    if gap <= 0 {
        return false;
    }
    if gap >= 7 {
        return true;
    }
    let from = after.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    // Days after `after` until the next occurrence of `weekday` (1..=7).
    let offset = (target - from).rem_euclid(7);
    let offset = if offset == 0 { 7 } else { offset };
    offset <= gap
}
