//! Temporal windows for selecting records by timestamp.
//!
//! A window is a closed interval: a record stamped exactly at `start` or
//! `end` is inside it. Windows are built either around a centre point
//! ([`TimeWindow::centered`], used by `timeslice`) or from an explicit
//! `"start > end"` range ([`TimeWindow::parse_range`], used by `timeframe`).

use crate::error::ToolboxError;
use crate::utils::time::{format_timestamp, parse_operator_time};
use chrono::{Duration, NaiveDateTime};
use std::fmt;

/// Half-widths at or above this many microseconds overflow `i64`.
const MAX_HALF_MICROS: f64 = 9.2e18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Window of `size_minutes` total width with `center` as its midpoint.
    ///
    /// Fractional minutes are honoured down to the microsecond.
    pub fn centered(center: NaiveDateTime, size_minutes: f64) -> Result<Self, ToolboxError> {
        if !size_minutes.is_finite() || size_minutes < 0.0 {
            return Err(ToolboxError::InvalidRadius(size_minutes));
        }

        let half_micros = (size_minutes * 60.0 * 1_000_000.0 / 2.0).round();
        if half_micros >= MAX_HALF_MICROS {
            return Err(ToolboxError::InvalidRadius(size_minutes));
        }
        let half = Duration::microseconds(half_micros as i64);

        match (
            center.checked_sub_signed(half),
            center.checked_add_signed(half),
        ) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(ToolboxError::InvalidRadius(size_minutes)),
        }
    }

    /// Parse `"YYYY-MM-DD HH:MM:SS > YYYY-MM-DD HH:MM:SS"`.
    ///
    /// Exactly one `>` separator is accepted, and the start may not be later
    /// than the end.
    pub fn parse_range(range: &str) -> Result<Self, ToolboxError> {
        let mut parts = range.split('>');
        let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ToolboxError::MalformedRange(range.to_string()));
        };

        let start = parse_operator_time(start.trim())?;
        let end = parse_operator_time(end.trim())?;
        if start > end {
            return Err(ToolboxError::MalformedRange(range.to_string()));
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn width(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} > {}",
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_operator_time(s).unwrap()
    }

    #[test]
    fn test_centered_one_minute() {
        let window = TimeWindow::centered(at("2019-07-22 20:04:31"), 1.0).unwrap();
        assert_eq!(window.start, at("2019-07-22 20:04:01"));
        assert_eq!(window.end, at("2019-07-22 20:05:01"));
        assert!(window.start < window.end);
    }

    #[test]
    fn test_centered_symmetry() {
        let center = at("2020-01-01 00:00:00");
        for size in [0.5, 1.0, 7.0, 30.0, 90.25] {
            let window = TimeWindow::centered(center, size).unwrap();
            assert_eq!(
                window.width(),
                Duration::microseconds((size * 60_000_000.0) as i64)
            );
            assert_eq!(center - window.start, window.end - center);
        }
    }

    #[test]
    fn test_centered_crosses_midnight() {
        let window = TimeWindow::centered(at("2019-07-22 23:59:50"), 1.0).unwrap();
        assert_eq!(window.end, at("2019-07-23 00:00:20"));
    }

    #[test]
    fn test_centered_rejects_bad_size() {
        let center = at("2019-07-22 20:04:31");
        assert!(TimeWindow::centered(center, -1.0).is_err());
        assert!(TimeWindow::centered(center, f64::NAN).is_err());
    }

    #[test]
    fn test_centered_rejects_out_of_range_size() {
        let center = at("2019-07-22 20:04:31");
        for size in [1e12, 1e17, f64::MAX] {
            assert!(matches!(
                TimeWindow::centered(center, size),
                Err(ToolboxError::InvalidRadius(_))
            ));
        }
        // A century either side is still representable
        assert!(TimeWindow::centered(center, 2.0 * 100.0 * 366.0 * 24.0 * 60.0).is_ok());
    }

    #[test]
    fn test_boundaries_inclusive() {
        let window =
            TimeWindow::parse_range("2019-07-22 20:00:00 > 2019-07-22 21:00:00").unwrap();
        assert!(window.contains(at("2019-07-22 20:00:00")));
        assert!(window.contains(at("2019-07-22 21:00:00")));
        assert!(!window.contains(at("2019-07-22 19:59:59")));
        assert!(!window.contains(at("2019-07-22 21:00:01")));
    }

    #[test]
    fn test_parse_range_errors() {
        assert!(matches!(
            TimeWindow::parse_range("2019-07-22 20:00:00"),
            Err(ToolboxError::MalformedRange(_))
        ));
        assert!(matches!(
            TimeWindow::parse_range("a > b > c"),
            Err(ToolboxError::MalformedRange(_))
        ));
        assert!(matches!(
            TimeWindow::parse_range("2019-07-22 20:00:00 > tomorrow"),
            Err(ToolboxError::InvalidTime(_))
        ));
        assert!(matches!(
            TimeWindow::parse_range("2019-07-22 21:00:00 > 2019-07-22 20:00:00"),
            Err(ToolboxError::MalformedRange(_))
        ));
    }

    #[test]
    fn test_display() {
        let window =
            TimeWindow::parse_range("2019-07-22 20:00:00 > 2019-07-22 21:00:00").unwrap();
        assert_eq!(window.to_string(), "2019-07-22 20:00:00 > 2019-07-22 21:00:00");
    }
}
