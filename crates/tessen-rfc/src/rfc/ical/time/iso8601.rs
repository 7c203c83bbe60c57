//! ISO 8601 timestamps in the basic form iCalendar uses.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{RfcError, RfcResult};

const BASIC_DATETIME: &str = "%Y%m%dT%H%M%S";
const BASIC_DATE: &str = "%Y%m%d";
const EXTENDED_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";
const EXTENDED_DATE: &str = "%Y-%m-%d";

/// A parsed ISO 8601 timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoDateTime {
    /// Wall-clock value; midnight for date-only input.
    pub value: NaiveDateTime,
    /// Input had no time part.
    pub is_date: bool,
    /// Input carried a trailing `Z`.
    pub is_utc: bool,
}

/// Formats a wall-clock value as `YYYYMMDDTHHMMSS`.
#[must_use]
pub fn format_iso8601(t: NaiveDateTime) -> String {
    t.format(BASIC_DATETIME).to_string()
}

/// Formats an instant as `YYYYMMDDTHHMMSSZ`.
#[must_use]
pub fn format_iso8601_utc(t: chrono::DateTime<Utc>) -> String {
    format!("{}Z", format_iso8601(t.naive_utc()))
}

/// Parses a basic (`20240101T090000Z`, `20240101`) or extended
/// (`2024-01-01T09:00:00`, `2024-01-01`) timestamp.
///
/// ## Errors
///
/// Returns `RfcError::ParseError` when the input matches none of the forms
/// or names a date that does not exist.
pub fn parse_iso8601(input: &str) -> RfcResult<IsoDateTime> {
    let trimmed = input.trim();
    let (body, is_utc) = match trimmed.strip_suffix(['Z', 'z']) {
        Some(body) => (body, true),
        None => (trimmed, false),
    };

    if body.contains('T') || body.contains('t') {
        let normalized = body.replace('t', "T");
        let value = NaiveDateTime::parse_from_str(&normalized, BASIC_DATETIME)
            .or_else(|_| NaiveDateTime::parse_from_str(&normalized, EXTENDED_DATETIME))
            .map_err(|e| RfcError::ParseError(format!("invalid date-time `{input}`: {e}")))?;
        return Ok(IsoDateTime {
            value,
            is_date: false,
            is_utc,
        });
    }

    if is_utc {
        return Err(RfcError::ParseError(format!(
            "date `{input}` cannot carry a UTC designator"
        )));
    }

    let date = NaiveDate::parse_from_str(body, BASIC_DATE)
        .or_else(|_| NaiveDate::parse_from_str(body, EXTENDED_DATE))
        .map_err(|e| RfcError::ParseError(format!("invalid date `{input}`: {e}")))?;
    Ok(IsoDateTime {
        value: date.and_time(NaiveTime::MIN),
        is_date: true,
        is_utc: false,
    })
}
