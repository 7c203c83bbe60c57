//! iCalendar DATE-TIME and TIME value types (RFC 5545 §3.3.5, §3.3.12).

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// UTC offset representation (e.g., +0530, -0800).
///
/// Stored as total seconds from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    seconds: i32,
}

impl UtcOffset {
    /// Creates a UTC offset from total seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Returns the offset as total seconds from UTC.
    #[must_use]
    pub const fn as_seconds(self) -> i32 {
        self.seconds
    }

    /// UTC offset (zero).
    pub const UTC: Self = Self { seconds: 0 };
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds >= 0 { '+' } else { '-' };
        let hours = self.seconds.abs() / 3600;
        let minutes = (self.seconds.abs() % 3600) / 60;
        write!(f, "{sign}{hours:02}{minutes:02}")
    }
}

/// Time value (RFC 5545 §3.3.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-60, allowing for leap seconds).
    pub second: u8,
    /// Whether this time is in UTC (indicated by 'Z' suffix).
    pub is_utc: bool,
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.hour, self.minute, self.second)?;
        if self.is_utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Form of DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeForm {
    /// Floating time - same wall-clock time in any timezone.
    Floating,

    /// UTC time - absolute instant, indicated by 'Z' suffix.
    Utc,

    /// Zoned time - local time with TZID reference.
    Zoned {
        /// The timezone identifier, forwarded untouched.
        tzid: String,
    },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    /// Year (e.g., 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-60, allowing for leap seconds).
    pub second: u8,
    /// The form of this DATE-TIME (floating, UTC, or zoned).
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub fn floating(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            form: DateTimeForm::Utc,
            ..Self::floating(year, month, day, hour, minute, second)
        }
    }

    /// Creates a zoned DATE-TIME.
    #[must_use]
    #[expect(
        clippy::too_many_arguments,
        reason = "Constructor mirrors RFC 5545 DATE-TIME components plus TZID"
    )]
    pub fn zoned(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        tzid: impl Into<String>,
    ) -> Self {
        Self {
            form: DateTimeForm::Zoned { tzid: tzid.into() },
            ..Self::floating(year, month, day, hour, minute, second)
        }
    }

    /// Builds a DATE-TIME from wall-clock fields and a form.
    ///
    /// Leap seconds collapse to `:59`; years outside `0..=9999` are clamped.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Year is clamped to 0..=9999 and the remaining fields are bounded by chrono"
    )]
    pub fn from_naive(naive: NaiveDateTime, form: DateTimeForm) -> Self {
        Self {
            year: naive.year().clamp(0, 9999) as u16,
            month: naive.month() as u8,
            day: naive.day() as u8,
            hour: naive.hour() as u8,
            minute: naive.minute() as u8,
            second: naive.second().min(59) as u8,
            form,
        }
    }

    /// Converts the wall-clock fields to a chrono value.
    ///
    /// Returns `None` when the fields do not form a real date or time. A leap
    /// second is read as `:59`.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?;
        let time = NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second.min(59)),
        )?;
        Some(date.and_time(time))
    }

    /// Returns whether this is a UTC time.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_offset_display() {
        assert_eq!(UtcOffset::from_seconds(5 * 3600 + 1800).to_string(), "+0530");
        assert_eq!(UtcOffset::from_seconds(-8 * 3600).to_string(), "-0800");
        assert_eq!(UtcOffset::UTC.to_string(), "+0000");
    }

    #[test]
    fn datetime_display() {
        assert_eq!(
            DateTime::utc(2026, 1, 23, 12, 0, 0).to_string(),
            "20260123T120000Z"
        );
        assert_eq!(
            DateTime::floating(2026, 1, 23, 12, 0, 0).to_string(),
            "20260123T120000"
        );
    }

    #[test]
    fn naive_bridge_keeps_fields() {
        let dt = DateTime::zoned(2024, 2, 29, 23, 59, 60, "Europe/Paris");
        let naive = dt.to_naive().expect("leap day is valid");
        assert_eq!(naive.to_string(), "2024-02-29 23:59:59");

        let back = DateTime::from_naive(naive, dt.form.clone());
        assert_eq!(back.tzid(), Some("Europe/Paris"));
        assert_eq!(back.second, 59);
    }

    #[test]
    fn naive_bridge_rejects_bad_fields() {
        assert!(DateTime::floating(2023, 2, 29, 0, 0, 0).to_naive().is_none());
        assert!(DateTime::floating(2023, 1, 1, 24, 0, 0).to_naive().is_none());
    }
}
