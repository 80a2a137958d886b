//! Post and event types for the Synheart Rhythm Agent.
//!
//! `RawPost` is the wire shape of an upstream post. `Event` is the immutable,
//! validated form the analysis core consumes: a UTC instant, the author's UTC
//! offset in whole hours, and the post text.

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Upstream timestamp format, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A single post as delivered by the upstream timeline API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPost {
    /// Creation time in the upstream format or RFC3339
    pub created_at: String,
    /// Author UTC offset in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_hours: Option<i32>,
    /// Author UTC offset in seconds (legacy profile field)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<i32>,
    /// Post body
    #[serde(default)]
    pub text: String,
}

impl RawPost {
    /// Create a post with an explicit hour offset.
    pub fn new(created_at: impl Into<String>, utc_offset_hours: i32, text: impl Into<String>) -> Self {
        Self {
            created_at: created_at.into(),
            utc_offset_hours: Some(utc_offset_hours),
            utc_offset: None,
            text: text.into(),
        }
    }

    /// Convert into an `Event`.
    ///
    /// The offset is resolved from `utc_offset_hours`, then the legacy
    /// `utc_offset` seconds field, then `fallback_tz` evaluated at the post's
    /// instant, and finally UTC.
    pub fn to_event(&self, fallback_tz: Option<Tz>) -> Result<Event, IngestError> {
        let timestamp = parse_created_at(&self.created_at)?;

        let utc_offset_hours = match (self.utc_offset_hours, self.utc_offset) {
            (Some(hours), _) => hours,
            (None, Some(seconds)) => seconds / 3600,
            (None, None) => fallback_tz
                .map(|tz| tz_offset_hours(tz, timestamp))
                .unwrap_or(0),
        };

        Ok(Event::new(timestamp, utc_offset_hours, self.text.clone()))
    }
}

/// A time-stamped, timezone-tagged post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// When the post was created
    pub timestamp: DateTime<Utc>,
    /// Author UTC offset in hours (applied unchecked)
    pub utc_offset_hours: i32,
    /// Post body
    pub text: String,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, utc_offset_hours: i32, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            utc_offset_hours,
            text: text.into(),
        }
    }

    /// Local minute of day under the given hour offset.
    ///
    /// Only the hour is shifted; the minute is taken from the UTC timestamp.
    pub fn local_minute_of_day(&self, offset_hours: i32) -> u32 {
        let hour = (self.timestamp.hour() as i64 + offset_hours as i64).rem_euclid(24) as u32;
        hour * 60 + self.timestamp.minute()
    }
}

/// Parse an upstream `created_at` value, accepting RFC3339 as a fallback.
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>, IngestError> {
    let value = value.trim();
    DateTime::<FixedOffset>::parse_from_str(value, CREATED_AT_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| IngestError::InvalidTimestamp(value.to_string()))
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, IngestError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| IngestError::UnknownTimezone(name.to_string()))
}

/// Whole-hour UTC offset of `tz` at the given instant.
pub fn tz_offset_hours(tz: Tz, at: DateTime<Utc>) -> i32 {
    tz.offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc()
        / 3600
}

/// Ingest errors.
#[derive(Debug)]
pub enum IngestError {
    IoError(String),
    ParseError(String),
    InvalidTimestamp(String),
    UnknownTimezone(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::IoError(e) => write!(f, "IO error: {e}"),
            IngestError::ParseError(e) => write!(f, "Parse error: {e}"),
            IngestError::InvalidTimestamp(v) => write!(f, "Invalid timestamp: {v:?}"),
            IngestError::UnknownTimezone(v) => write!(f, "Unknown timezone: {v:?}"),
        }
    }
}

impl std::error::Error for IngestError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_upstream_format() {
        let ts = parse_created_at("Wed Oct 10 20:19:24 +0000 2018").unwrap();
        assert_eq!(ts.year(), 2018);
        assert_eq!(ts.hour(), 20);
        assert_eq!(ts.minute(), 19);
    }

    #[test]
    fn test_parse_rfc3339_fallback() {
        let ts = parse_created_at("2024-01-22T10:05:00Z").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 5);
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        assert!(matches!(
            parse_created_at("yesterday"),
            Err(IngestError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_local_minute_wraps_negative_offset() {
        let ts = parse_created_at("2024-01-22T02:30:00Z").unwrap();
        let event = Event::new(ts, -5, "late");
        // 02:30 UTC at -5 is 21:30 local
        assert_eq!(event.local_minute_of_day(-5), 21 * 60 + 30);
    }

    #[test]
    fn test_local_minute_applies_large_offset_unchecked() {
        let ts = parse_created_at("2024-01-22T10:00:00Z").unwrap();
        let event = Event::new(ts, 30, "odd");
        assert_eq!(event.local_minute_of_day(30), 16 * 60);
    }

    #[test]
    fn test_offset_resolution_order() {
        let mut post = RawPost::new("2024-07-01T12:00:00Z", 3, "hi");
        assert_eq!(post.to_event(None).unwrap().utc_offset_hours, 3);

        post.utc_offset_hours = None;
        post.utc_offset = Some(-25200);
        assert_eq!(post.to_event(None).unwrap().utc_offset_hours, -7);

        post.utc_offset = None;
        let tz = parse_timezone("America/Los_Angeles").unwrap();
        // PDT in July
        assert_eq!(post.to_event(Some(tz)).unwrap().utc_offset_hours, -7);
        assert_eq!(post.to_event(None).unwrap().utc_offset_hours, 0);
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
