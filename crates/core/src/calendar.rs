//! Calendar-day arithmetic.
//!
//! The engine only ever asks one question of a calendar: which civil day does an instant fall on?
//! Everything else (the inclusive day count for a dosing window) is derived from that answer.
//!
//! Callers choose the calendar. Mixing calendars within a study causes off-by-one drift around
//! midnight and DST transitions, so the configured calendar should be resolved once at startup
//! (see [`crate::config::CoreConfig`]) and reused.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

/// Maps instants onto civil days.
pub trait Calendar {
    /// The civil day `instant` falls on in this calendar.
    fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate;

    /// Inclusive number of civil days from `start` to `end`.
    ///
    /// Both instants are truncated to their day first, so `start == end` yields 1. If `end`
    /// falls on an earlier day than `start` the result is zero or negative; the engine rejects
    /// that ordering before it gets here.
    fn days_between_inclusive(&self, start: &DateTime<Utc>, end: &DateTime<Utc>) -> i64 {
        (self.day_of(end) - self.day_of(start)).num_days() + 1
    }
}

impl Calendar for Utc {
    fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.date_naive()
    }
}

impl Calendar for FixedOffset {
    fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(self).date_naive()
    }
}

impl Calendar for Local {
    fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(self).date_naive()
    }
}

/// Free-function form of [`Calendar::days_between_inclusive`].
pub fn days_between_inclusive<C: Calendar + ?Sized>(
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    calendar: &C,
) -> i64 {
    calendar.days_between_inclusive(start, end)
}
