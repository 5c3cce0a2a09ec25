use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::ValidationError;

/// Parse an ISO-8601 timestamp as stored in the tables.
///
/// Accepts RFC 3339 (`Z` or an explicit offset), a naive date-time which is
/// taken as UTC, and a bare `YYYY-MM-DD` date at midnight UTC.
pub fn parse_timestamp(field: &str, s: &str) -> Result<DateTime<Utc>, ValidationError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(ValidationError::invalid(field, s, "expected ISO-8601 timestamp"))
}

/// Render a timestamp the way the tables store it, keeping sub-second precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_date(field: &str, s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::invalid(field, s, "expected YYYY-MM-DD"))
}
