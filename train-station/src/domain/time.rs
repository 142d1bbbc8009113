//! Timestamp and calendar-date parsing for trips.
//!
//! Trip times are naive UTC timestamps. They are rendered as
//! `YYYY-MM-DD HH:MM` and accepted with or without seconds, using either a
//! space or `T` between date and time.

use chrono::{NaiveDate, NaiveDateTime};

/// Output format for trip departure/arrival times.
pub const TRIP_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format for calendar-date filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const ACCEPTED_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Error returned when parsing an invalid time or date string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} {input:?}: expected {expected}")]
pub struct TimeError {
    kind: &'static str,
    input: String,
    expected: &'static str,
}

/// Render a trip timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_trip_time(time: &NaiveDateTime) -> String {
    time.format(TRIP_TIME_FORMAT).to_string()
}

/// Parse a trip timestamp.
pub fn parse_trip_time(s: &str) -> Result<NaiveDateTime, TimeError> {
    let s = s.trim();
    ACCEPTED_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| TimeError {
            kind: "timestamp",
            input: s.to_string(),
            expected: "YYYY-MM-DD HH:MM[:SS]",
        })
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| TimeError {
        kind: "date",
        input: s.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// Serde adapter for trip timestamps.
pub mod trip_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_trip_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_trip_time(&raw).map_err(serde::de::Error::custom)
    }
}
