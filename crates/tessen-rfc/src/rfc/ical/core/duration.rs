//! iCalendar DURATION value type (RFC 5545 §3.3.6).

use std::fmt;

use chrono::TimeDelta;

/// Duration value (RFC 5545 §3.3.6).
///
/// Either week-based (`P1W`) or day/time-based (`P1DT2H30M`). iCalendar has no
/// year or month designators because those have variable lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
    /// Whether this duration is negative.
    pub negative: bool,
    /// Number of weeks (mutually exclusive with days/hours/minutes/seconds).
    pub weeks: u32,
    /// Number of days.
    pub days: u32,
    /// Number of hours.
    pub hours: u32,
    /// Number of minutes.
    pub minutes: u32,
    /// Number of seconds.
    pub seconds: u32,
}

impl Duration {
    /// Creates a new zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self::builder().build()
    }

    /// Creates a duration from weeks.
    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        Self::builder().weeks(weeks).build()
    }

    /// Creates a duration from days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self::builder().days(days).build()
    }

    /// Creates a duration from hours.
    #[must_use]
    pub const fn hours(hours: u32) -> Self {
        Self::builder().hours(hours).build()
    }

    /// Creates a duration from minutes.
    #[must_use]
    pub const fn minutes(minutes: u32) -> Self {
        Self::builder().minutes(minutes).build()
    }

    /// Creates a new duration builder.
    #[must_use]
    pub const fn builder() -> DurationBuilder {
        DurationBuilder::new()
    }

    /// Negates this duration.
    #[must_use]
    pub const fn negate(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Returns the total duration as seconds.
    #[must_use]
    pub const fn as_seconds(&self) -> i64 {
        let total = (self.weeks as i64 * 7 * 24 * 3600)
            + (self.days as i64 * 24 * 3600)
            + (self.hours as i64 * 3600)
            + (self.minutes as i64 * 60)
            + (self.seconds as i64);

        if self.negative { -total } else { total }
    }

    /// Returns the nominal day part (weeks folded in) and the exact time part.
    ///
    /// Calendar arithmetic adds the day part as calendar days so wall-clock
    /// time survives DST shifts, and the time part as elapsed seconds.
    #[must_use]
    pub const fn split(&self) -> (i64, i64) {
        let days = self.weeks as i64 * 7 + self.days as i64;
        let secs = self.hours as i64 * 3600 + self.minutes as i64 * 60 + self.seconds as i64;
        if self.negative { (-days, -secs) } else { (days, secs) }
    }

    /// Builds a day/time duration from a chrono delta, dropping sub-second parts.
    ///
    /// Whole multiples of a week are expressed in weeks.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Components are reduced modulo their unit and saturate at u32::MAX days"
    )]
    pub fn from_time_delta(delta: TimeDelta) -> Self {
        let total = delta.num_seconds();
        let negative = total < 0;
        let abs = total.unsigned_abs();

        let days = abs / 86_400;
        let rem = abs % 86_400;
        let builder = if rem == 0 && days > 0 && days % 7 == 0 {
            Self::builder().weeks(u32::try_from(days / 7).unwrap_or(u32::MAX))
        } else {
            Self::builder()
                .days(u32::try_from(days).unwrap_or(u32::MAX))
                .hours((rem / 3600) as u32)
                .minutes(((rem % 3600) / 60) as u32)
                .seconds((rem % 60) as u32)
        };

        if negative {
            builder.negative().build()
        } else {
            builder.build()
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;

        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 {
            write!(f, "0D")?;
        }
        Ok(())
    }
}

/// Builder for constructing `Duration` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationBuilder {
    inner: Duration,
}

impl DurationBuilder {
    /// Creates a new duration builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Duration {
                negative: false,
                weeks: 0,
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
            },
        }
    }

    /// Sets the duration as negative.
    #[must_use]
    pub const fn negative(mut self) -> Self {
        self.inner.negative = true;
        self
    }

    #[must_use]
    pub const fn weeks(mut self, weeks: u32) -> Self {
        self.inner.weeks = weeks;
        self
    }

    #[must_use]
    pub const fn days(mut self, days: u32) -> Self {
        self.inner.days = days;
        self
    }

    #[must_use]
    pub const fn hours(mut self, hours: u32) -> Self {
        self.inner.hours = hours;
        self
    }

    #[must_use]
    pub const fn minutes(mut self, minutes: u32) -> Self {
        self.inner.minutes = minutes;
        self
    }

    #[must_use]
    pub const fn seconds(mut self, seconds: u32) -> Self {
        self.inner.seconds = seconds;
        self
    }

    /// Builds the duration.
    #[must_use]
    pub const fn build(self) -> Duration {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_display() {
        assert_eq!(Duration::weeks(2).to_string(), "P2W");
        assert_eq!(
            Duration::builder().days(1).hours(2).minutes(30).build().to_string(),
            "P1DT2H30M"
        );
        assert_eq!(Duration::minutes(15).negate().to_string(), "-PT15M");
        assert_eq!(Duration::zero().to_string(), "P0D");
    }

    #[test]
    fn duration_split_folds_weeks() {
        assert_eq!(Duration::weeks(1).split(), (7, 0));
        let d = Duration::builder().days(1).hours(2).build().negate();
        assert_eq!(d.split(), (-1, -7200));
    }

    #[test]
    fn from_time_delta_normalizes() {
        assert_eq!(Duration::from_time_delta(TimeDelta::hours(1)), Duration::hours(1));
        assert_eq!(Duration::from_time_delta(TimeDelta::days(14)), Duration::weeks(2));

        let d = Duration::from_time_delta(TimeDelta::seconds(-(86_400 + 90)));
        assert!(d.negative);
        assert_eq!((d.days, d.minutes, d.seconds), (1, 1, 30));
        assert_eq!(d.as_seconds(), -(86_400 + 90));
    }
}
