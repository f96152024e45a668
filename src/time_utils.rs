// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar-day arithmetic.
//!
//! Streaks and rollups are scoped to calendar days in a single reference
//! timezone (UTC). Time-of-day never enters streak math; days are
//! `NaiveDate` everywhere past the HTTP boundary.

use chrono::{DateTime, Datelike, Days, NaiveDate, SecondsFormat, Utc, Weekday};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The calendar day of a UTC timestamp.
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Whole-day difference `later - earlier`. Negative if `later` precedes `earlier`.
pub fn gap_days(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// Monday-start week bounds `(start, end)` containing `day`, inclusive.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_from_monday = day.weekday().num_days_from_monday() as u64;
    let start = day - Days::new(days_from_monday);
    let end = start + Days::new(6);
    (start, end)
}
