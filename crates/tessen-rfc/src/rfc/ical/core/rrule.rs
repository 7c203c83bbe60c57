//! iCalendar RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10, §3.8.5.3).

use std::fmt;

use super::{Date, DateTime};

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Returns whether the frequency is daily or coarser.
    #[must_use]
    pub const fn is_daily_or_coarser(self) -> bool {
        matches!(
            self,
            Self::Daily | Self::Weekly | Self::Monthly | Self::Yearly
        )
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Converts to the chrono weekday.
    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number, as used in BYDAY.
///
/// - `MO` - every Monday
/// - `1MO` - first Monday of the month/year
/// - `-1FR` - last Friday of the month/year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayNum {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// ## Panics
    ///
    /// Panics if ordinal is 0 or outside the range -53..=53.
    #[must_use]
    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        assert!(ordinal != 0 && (-53..=53).contains(&ordinal));
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// UNTIL value for RRULE - either DATE or DATE-TIME.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RRuleUntil {
    /// Date-only boundary (inclusive of the whole day).
    Date(Date),
    /// Date-time boundary (inclusive).
    DateTime(DateTime),
}

impl fmt::Display for RRuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Termination is either a count or an UNTIL boundary, never both; a rule
/// with neither repeats forever.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RRule {
    /// Recurrence frequency (required for expansion).
    pub freq: Option<Frequency>,

    /// Recurrence interval (default: 1).
    pub interval: Option<u32>,

    /// End date/time of the recurrence (mutually exclusive with count).
    pub until: Option<RRuleUntil>,

    /// Number of occurrences (mutually exclusive with until). `0` means unbounded.
    pub count: Option<u32>,

    /// Week start day (default: Monday).
    pub wkst: Option<Weekday>,

    /// By-second list (0-60, 60 for leap second).
    pub by_second: Vec<u8>,

    /// By-minute list (0-59).
    pub by_minute: Vec<u8>,

    /// By-hour list (0-23).
    pub by_hour: Vec<u8>,

    /// By-day list with optional occurrence numbers.
    pub by_day: Vec<WeekdayNum>,

    /// By-monthday list (-31 to 31, excluding 0).
    pub by_monthday: Vec<i8>,

    /// By-yearday list (-366 to 366, excluding 0).
    pub by_yearday: Vec<i16>,

    /// By-weekno list (-53 to 53, excluding 0, ISO 8601).
    pub by_weekno: Vec<i8>,

    /// By-month list (1-12).
    pub by_month: Vec<u8>,

    /// By-setpos list (-366 to 366, excluding 0).
    pub by_setpos: Vec<i16>,
}

impl RRule {
    /// Creates a new empty recurrence rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule with the given frequency.
    #[must_use]
    pub fn with_freq(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    /// Creates a daily recurrence rule.
    #[must_use]
    pub fn daily() -> Self {
        Self::with_freq(Frequency::Daily)
    }

    /// Creates a weekly recurrence rule.
    #[must_use]
    pub fn weekly() -> Self {
        Self::with_freq(Frequency::Weekly)
    }

    /// Creates a monthly recurrence rule.
    #[must_use]
    pub fn monthly() -> Self {
        Self::with_freq(Frequency::Monthly)
    }

    /// Creates a yearly recurrence rule.
    #[must_use]
    pub fn yearly() -> Self {
        Self::with_freq(Frequency::Yearly)
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the count, clearing any UNTIL.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None;
        self
    }

    /// Sets the until date, clearing any COUNT.
    #[must_use]
    pub fn with_until_date(mut self, date: Date) -> Self {
        self.until = Some(RRuleUntil::Date(date));
        self.count = None;
        self
    }

    /// Sets the until date-time, clearing any COUNT.
    #[must_use]
    pub fn with_until_datetime(mut self, datetime: DateTime) -> Self {
        self.until = Some(RRuleUntil::DateTime(datetime));
        self.count = None;
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }

    /// Sets the by-monthday list.
    #[must_use]
    pub fn with_by_monthday(mut self, days: Vec<i8>) -> Self {
        self.by_monthday = days;
        self
    }

    /// Sets the by-month list.
    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }

    /// Sets the by-setpos list.
    #[must_use]
    pub fn with_by_setpos(mut self, positions: Vec<i16>) -> Self {
        self.by_setpos = positions;
        self
    }

    /// Sets the week start day.
    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// Returns the interval, defaulting to 1.
    #[must_use]
    pub fn interval_or_default(&self) -> u32 {
        self.interval.unwrap_or(1)
    }
}

/// Appends `NAME=a,b,c` when the list is non-empty.
fn push_list<T: fmt::Display>(parts: &mut Vec<String>, name: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }
    let joined: Vec<_> = items.iter().map(ToString::to_string).collect();
    parts.push(format!("{name}={}", joined.join(",")));
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(freq) = self.freq {
            parts.push(format!("FREQ={freq}"));
        }
        if let Some(interval) = self.interval
            && interval != 1
        {
            parts.push(format!("INTERVAL={interval}"));
        }
        if let Some(ref until) = self.until {
            parts.push(format!("UNTIL={until}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(wkst) = self.wkst {
            parts.push(format!("WKST={wkst}"));
        }

        push_list(&mut parts, "BYSECOND", &self.by_second);
        push_list(&mut parts, "BYMINUTE", &self.by_minute);
        push_list(&mut parts, "BYHOUR", &self.by_hour);
        push_list(&mut parts, "BYDAY", &self.by_day);
        push_list(&mut parts, "BYMONTHDAY", &self.by_monthday);
        push_list(&mut parts, "BYYEARDAY", &self.by_yearday);
        push_list(&mut parts, "BYWEEKNO", &self.by_weekno);
        push_list(&mut parts, "BYMONTH", &self.by_month);
        push_list(&mut parts, "BYSETPOS", &self.by_setpos);

        write!(f, "{}", parts.join(";"))
    }
}
