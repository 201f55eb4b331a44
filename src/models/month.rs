//! Calendar month context.
//!
//! A roster targets exactly one calendar month. `RosterMonth` validates the
//! (year, month) pair once at construction and answers all date arithmetic
//! for it: per-day dates and weekdays, and the Sunday-based week bucketing
//! used by the weekly validation rules.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A validated calendar month.
///
/// Construction checks that the (year, month) pair names a real month and
/// caches its first day and day count, so the per-day helpers are infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMonth", into = "RawMonth")]
pub struct RosterMonth {
    year: i32,
    month: u32,
    first_day: NaiveDate,
    day_count: u32,
}

/// Serialized form of [`RosterMonth`] — just the (year, month) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawMonth {
    year: i32,
    month: u32,
}

impl RosterMonth {
    /// Creates a month context, or `None` if (year, month) is not a valid
    /// calendar month.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let day_count = next_first.signed_duration_since(first_day).num_days() as u32;
        Some(Self {
            year,
            month,
            first_day,
            day_count,
        })
    }

    /// Calendar year.
    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month (1-12).
    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month.
    #[inline]
    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    /// Iterates day numbers 1..=day_count.
    pub fn days(&self) -> RangeInclusive<u32> {
        1..=self.day_count
    }

    /// The date of the given day number (1-based).
    ///
    /// Day numbers outside 1..=day_count are clamped into the month.
    pub fn date(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.day_count);
        self.first_day + Duration::days(day as i64 - 1)
    }

    /// The weekday of the given day number.
    pub fn weekday(&self, day: u32) -> Weekday {
        self.date(day).weekday()
    }

    /// Sunday-based week bucket for the given day number.
    ///
    /// Returns the day number of that week's Sunday, which may be zero or
    /// negative for the first partial week. Two days share a bucket iff they
    /// fall in the same Sunday-to-Saturday week.
    pub fn week_key(&self, day: u32) -> i64 {
        day as i64 - self.weekday(day).num_days_from_sunday() as i64
    }

    /// Whether a date falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Maps a date to its day number, if it falls inside this month.
    pub fn day_of(&self, date: NaiveDate) -> Option<u32> {
        self.contains(date).then(|| date.day())
    }
}

impl TryFrom<RawMonth> for RosterMonth {
    type Error = String;

    fn try_from(raw: RawMonth) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
            .ok_or_else(|| format!("invalid calendar month: {}-{:02}", raw.year, raw.month))
    }
}

impl From<RosterMonth> for RawMonth {
    fn from(m: RosterMonth) -> Self {
        Self {
            year: m.year,
            month: m.month,
        }
    }
}
