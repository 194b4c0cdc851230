//! Resolution of user supplied `--since` / `--until` values into a concrete
//! UTC window.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clawiq_protocol::timestamp;
use regex::Regex;
use serde::Serialize;

use crate::error::QueryError;

/// Window used when the caller gives no `since`.
pub const DEFAULT_SINCE: &str = "24h";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Closed time window, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    #[serde(serialize_with = "timestamp::serialize")]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn start_param(&self) -> String {
        timestamp::format(&self.start)
    }

    pub fn end_param(&self) -> String {
        timestamp::format(&self.end)
    }
}

fn relative_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(\d+)\s*([smhdw])$").expect("relative time pattern is valid")
    })
}

fn unit_seconds(unit: &str) -> i64 {
    match unit.to_ascii_lowercase().as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => 7 * 24 * 60 * 60,
    }
}

/// Parses one time value. Relative values (`15m`, `24h`, `7d`) count back
/// from `reference`; `now` is `reference` itself.
pub fn parse_time_value(input: &str, reference: DateTime<Utc>) -> Result<DateTime<Utc>, QueryError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(QueryError::invalid_time(input, "time value cannot be empty"));
    }

    if value.eq_ignore_ascii_case("now") {
        return Ok(reference);
    }

    if let Some(captures) = relative_time_pattern().captures(value) {
        let delta = captures[1]
            .parse::<i64>()
            .ok()
            .and_then(|amount| amount.checked_mul(unit_seconds(&captures[2])))
            .filter(|seconds| *seconds > 0)
            .and_then(Duration::try_seconds)
            .ok_or_else(|| QueryError::invalid_time(input, "invalid relative time"))?;

        return reference
            .checked_sub_signed(delta)
            .ok_or_else(|| QueryError::invalid_time(input, "relative time is out of range"));
    }

    parse_absolute(value).ok_or_else(|| {
        QueryError::invalid_time(
            input,
            "use ISO time or relative values like 15m, 24h, 7d",
        )
    })
}

/// Absolute values without an offset are read as UTC.
fn parse_absolute(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolves a window against the current clock.
pub fn resolve_time_range(
    since: Option<&str>,
    until: Option<&str>,
    default_since: &str,
) -> Result<TimeRange, QueryError> {
    resolve_time_range_at(since, until, default_since, Utc::now())
}

/// Resolves a window against a fixed `now`.
///
/// `until` is resolved first; a relative `since` then counts back from the
/// resolved end, so `--since 1h --until 2h` covers the hour before `now - 2h`.
pub fn resolve_time_range_at(
    since: Option<&str>,
    until: Option<&str>,
    default_since: &str,
    now: DateTime<Utc>,
) -> Result<TimeRange, QueryError> {
    let end = match until.filter(|value| !value.is_empty()) {
        Some(value) => parse_time_value(value, now)?,
        None => now,
    };
    let since = since.filter(|value| !value.is_empty()).unwrap_or(default_since);
    let start = parse_time_value(since, end)?;

    if start > end {
        return Err(QueryError::InvalidTimeRange {
            start: timestamp::format(&start),
            end: timestamp::format(&end),
        });
    }

    Ok(TimeRange { start, end })
}
