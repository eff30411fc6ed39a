use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 in UTC, so string order matches time order in SQL.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

/// Half-open `[start 00:00, end + 1 day 00:00)` bounds covering whole days.
pub fn day_range_bounds(start: NaiveDate, end: NaiveDate) -> (String, String) {
    let lower = format_timestamp(&start.and_time(NaiveTime::MIN).and_utc());
    let upper = end
        .succ_opt()
        .map(|next| format_timestamp(&next.and_time(NaiveTime::MIN).and_utc()))
        .unwrap_or_else(|| OPEN_UPPER_BOUND.to_string());
    (lower, upper)
}

const OPEN_UPPER_BOUND: &str = "9999-12-31T23:59:59.999999Z";
