//! Calendar helpers for provider query strings.
//!
//! Finnhub takes `from`/`to` as plain `YYYY-MM-DD` dates, interpreted on the
//! exchange calendar, so windows are computed in US/Eastern rather than UTC.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::America::New_York;
use serde::Serializer;

const FORMAT: &str = "%Y-%m-%d";

/// Serialize a `NaiveDate` into "YYYY-MM-DD" format.
pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = date.format(FORMAT).to_string();
    serializer.serialize_str(&s)
}

/// Inclusive `(from, to)` window ending on today's New York date.
pub fn lookback_window(now: DateTime<Utc>, days: i64) -> (NaiveDate, NaiveDate) {
    let to = now.with_timezone(&New_York).date_naive();
    let from = to - Duration::days(days.max(1));
    (from, to)
}
