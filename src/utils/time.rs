use crate::error::ToolboxError;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Layout operators type on the command line.
pub const OPERATOR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of the significant prefix of a record `timestamp`.
const RECORD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Significant characters of a record timestamp (`YYYY-MM-DDTHH:MM:SS`).
const RECORD_PREFIX_LEN: usize = 19;

/// Parse a `YYYY-MM-DD HH:MM:SS` time given on the command line.
pub fn parse_operator_time(s: &str) -> Result<NaiveDateTime, ToolboxError> {
    NaiveDateTime::parse_from_str(s.trim(), OPERATOR_FORMAT)
        .map_err(|_| ToolboxError::InvalidTime(s.to_string()))
}

/// Parse a record timestamp to second resolution.
///
/// Only the first 19 characters are used, so fractional seconds and the
/// zone suffix (`.212077Z`, `+00:00`) are ignored.
pub fn parse_record_timestamp(ts: &str) -> Result<NaiveDateTime> {
    let prefix = ts
        .get(..RECORD_PREFIX_LEN)
        .ok_or_else(|| anyhow!("Timestamp too short: {}", ts))?;
    NaiveDateTime::parse_from_str(prefix, RECORD_FORMAT)
        .with_context(|| format!("Failed to parse timestamp: {}", ts))
}

/// Parse a full RFC 3339 record timestamp, keeping sub-second precision.
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .context("Failed to parse timestamp")
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a window bound for display.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(OPERATOR_FORMAT).to_string()
}

/// Format a UTC timestamp for display, keeping microseconds.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string()
}

/// Calculate duration between two timestamps in human-readable format
pub fn duration_human(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    let duration = end.signed_duration_since(*start);
    let seconds = duration.num_seconds();

    if seconds < 60 {
        format!("{} seconds", seconds)
    } else if seconds < 3600 {
        format!("{} minutes", seconds / 60)
    } else if seconds < 86400 {
        format!("{:.1} hours", seconds as f64 / 3600.0)
    } else {
        format!("{:.1} days", seconds as f64 / 86400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_operator_time() {
        let dt = parse_operator_time("2019-07-22 20:04:31").unwrap();
        assert_eq!(dt.year(), 2019);
        assert_eq!(dt.hour(), 20);
        assert_eq!(dt.second(), 31);

        assert!(matches!(
            parse_operator_time("2019-07-22T20:04:31"),
            Err(ToolboxError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_parse_record_timestamp_ignores_suffix() {
        let a = parse_record_timestamp("2019-07-22T20:04:31.212077Z").unwrap();
        let b = parse_record_timestamp("2019-07-22T20:04:31+02:00").unwrap();
        let c = parse_record_timestamp("2019-07-22T20:04:31").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_parse_record_timestamp_errors() {
        assert!(parse_record_timestamp("2019-07-22").is_err());
        assert!(parse_record_timestamp("2019-07-22 20:04:31.000Z").is_err());
        assert!(parse_record_timestamp("").is_err());
    }

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_timestamp("2019-07-22T20:04:31.212077Z").unwrap();
        assert_eq!(dt.month(), 7);
        assert_eq!(dt.nanosecond(), 212_077_000);
        assert_eq!(format_utc(&dt), "2019-07-22 20:04:31.212077 UTC");
    }

    #[test]
    fn test_duration_human() {
        let start = parse_timestamp("2019-07-22T20:04:31Z").unwrap();
        let end = parse_timestamp("2019-07-23T13:23:06Z").unwrap();
        assert_eq!(duration_human(&start, &end), "17.3 hours");
    }
}
