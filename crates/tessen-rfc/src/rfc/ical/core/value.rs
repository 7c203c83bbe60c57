//! iCalendar DATE, PERIOD and GEO values and the `Value` union (RFC 5545 §3.3).

use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::{DateTime, Duration, RRule, Time, UtcOffset};

/// DATE value (RFC 5545 §3.3.4).
///
/// A calendar date without time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    /// Year (e.g., 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
}

impl Date {
    /// Creates a new date.
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Converts to a chrono date, `None` if the fields do not form a real date.
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }

    /// Builds a DATE from a chrono date.
    ///
    /// Years outside `0..=9999` are not representable in iCalendar and are clamped.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Year is clamped to 0..=9999 and month/day are bounded by chrono"
    )]
    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(0, 9999) as u16,
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// PERIOD value (RFC 5545 §3.3.9).
///
/// Either an explicit start and end, or a start and a duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    /// Explicit start and end times.
    Explicit {
        /// Start of the period.
        start: DateTime,
        /// End of the period.
        end: DateTime,
    },
    /// Start time and duration.
    Duration {
        /// Start of the period.
        start: DateTime,
        /// Length of the period.
        duration: Duration,
    },
}

impl Period {
    /// Creates an explicit period from start to end.
    #[must_use]
    pub fn explicit(start: DateTime, end: DateTime) -> Self {
        Self::Explicit { start, end }
    }

    /// Creates a period from a start time and duration.
    #[must_use]
    pub fn from_duration(start: DateTime, duration: Duration) -> Self {
        Self::Duration { start, duration }
    }

    /// Returns the start of the period.
    #[must_use]
    pub fn start(&self) -> &DateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => start,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => write!(f, "{start}/{end}"),
            Self::Duration { start, duration } => write!(f, "{start}/{duration}"),
        }
    }
}

/// GEO value (RFC 5545 §3.8.1.6): latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geo {
    pub latitude: f64,
    pub longitude: f64,
}

impl Geo {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Geo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.latitude, self.longitude)
    }
}

/// Value types (RFC 5545 §3.3).
///
/// The parsed value of a property. The raw string is preserved separately
/// on the property for round-trip fidelity.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// BINARY value (already decoded).
    Binary(Vec<u8>),
    /// BOOLEAN value.
    Boolean(bool),
    /// CAL-ADDRESS value (typically mailto: URI).
    CalAddress(String),
    /// DATE value.
    Date(Date),
    /// DATE-TIME value.
    DateTime(DateTime),
    /// DURATION value.
    Duration(Duration),
    /// FLOAT value.
    Float(f64),
    /// GEO value (structured pair of floats).
    Geo(Geo),
    /// INTEGER value.
    Integer(i32),
    /// PERIOD value.
    Period(Period),
    /// RECUR value (recurrence rule).
    Recur(Box<RRule>),
    /// TEXT value (unescaped).
    Text(String),
    /// TEXT-LIST value (multiple comma-separated texts).
    TextList(Vec<String>),
    /// TIME value.
    Time(Time),
    /// URI value.
    Uri(String),
    /// UTC-OFFSET value.
    UtcOffset(UtcOffset),
    /// Unknown or unparsed value. Preserved for round-trip.
    Unknown(String),
}

impl Value {
    /// Returns this value as text, if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string payload of any string-shaped value.
    ///
    /// Covers TEXT, CAL-ADDRESS, URI and unparsed values, which external
    /// parsers disagree on for properties such as URL or ORGANIZER.
    #[must_use]
    pub fn as_str_like(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CalAddress(s) | Self::Uri(s) | Self::Unknown(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns this value as a date-time, if it is a date-time value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns this value as a duration, if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as a recurrence rule, if it is a recur value.
    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::CalAddress(s) | Self::Text(s) | Self::Uri(s) | Self::Unknown(s) => {
                write!(f, "{s}")
            }
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Geo(g) => write!(f, "{g}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Period(p) => write!(f, "{p}"),
            Self::Recur(r) => write!(f, "{r}"),
            Self::TextList(items) => write!(f, "{}", items.join(",")),
            Self::Time(t) => write!(f, "{t}"),
            Self::UtcOffset(o) => write!(f, "{o}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_display() {
        assert_eq!(Date::new(2026, 1, 23).to_string(), "20260123");
    }

    #[test]
    fn date_rejects_impossible_day() {
        assert!(Date::new(2023, 2, 29).to_naive().is_none());
        assert!(Date::new(2024, 2, 29).to_naive().is_some());
    }

    #[test]
    fn period_duration_display() {
        let start = DateTime::utc(2026, 1, 23, 9, 0, 0);
        let period = Period::from_duration(start, Duration::hours(8));
        assert_eq!(period.to_string(), "20260123T090000Z/PT8H");
    }

    #[test]
    fn geo_display() {
        assert_eq!(Geo::new(37.386_013, -122.082_932).to_string(), "37.386013;-122.082932");
    }

    #[test]
    fn str_like_covers_address_kinds() {
        assert_eq!(
            Value::CalAddress("mailto:a@example.com".into()).as_str_like(),
            Some("mailto:a@example.com")
        );
        assert_eq!(Value::Integer(3).as_str_like(), None);
    }
}
