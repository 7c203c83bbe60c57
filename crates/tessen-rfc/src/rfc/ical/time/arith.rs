//! Calendar-field arithmetic and period boundaries.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::rfc::ical::core::{Duration, Weekday};

fn saturate(t: NaiveDateTime, forward: bool) -> NaiveDateTime {
    tracing::trace!(%t, forward, "Calendar arithmetic saturated");
    if forward {
        NaiveDateTime::MAX
    } else {
        NaiveDateTime::MIN
    }
}

/// Adds `minutes` of elapsed time.
#[must_use]
pub fn add_minutes(t: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    TimeDelta::try_minutes(minutes)
        .and_then(|d| t.checked_add_signed(d))
        .unwrap_or_else(|| saturate(t, minutes >= 0))
}

/// Adds calendar days, keeping the time of day.
#[must_use]
pub fn add_days(t: NaiveDateTime, days: i64) -> NaiveDateTime {
    let shifted = if days >= 0 {
        t.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        t.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or_else(|| saturate(t, days >= 0))
}

/// Adds an iCalendar duration: weeks and days as calendar days, the rest
/// as elapsed time.
#[must_use]
pub fn add_duration(t: NaiveDateTime, duration: &Duration) -> NaiveDateTime {
    let (days, secs) = duration.split();
    let shifted = add_days(t, days);
    TimeDelta::try_seconds(secs)
        .and_then(|d| shifted.checked_add_signed(d))
        .unwrap_or_else(|| saturate(shifted, secs >= 0))
}

/// Adds calendar weeks, keeping the time of day.
#[must_use]
pub fn add_weeks(t: NaiveDateTime, weeks: i64) -> NaiveDateTime {
    add_days(t, weeks.saturating_mul(7))
}

/// Adds calendar months. A day missing from the target month is clamped to
/// its last day (Jan 31 + 1 month = Feb 28/29).
#[must_use]
pub fn add_months(t: NaiveDateTime, months: i32) -> NaiveDateTime {
    let shifted = if months >= 0 {
        t.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        t.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or_else(|| saturate(t, months >= 0))
}

/// Adds calendar years. Feb 29 maps to Feb 28 in non-leap years.
#[must_use]
pub fn add_years(t: NaiveDateTime, years: i32) -> NaiveDateTime {
    add_months(t, years.saturating_mul(12))
}

/// Returns whether `year` is a Gregorian leap year.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Returns the number of days in `month` (1-12) of `year`; `0` for a bad month.
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Returns the 1-based day of the year.
#[must_use]
pub fn day_of_year(t: NaiveDateTime) -> u32 {
    t.ordinal()
}

/// Midnight at the start of `t`'s day.
#[must_use]
pub fn day_begin(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_time(NaiveTime::MIN)
}

/// Midnight at the start of the following day.
///
/// Boundaries are half-open, so the end of a day is the next day's begin.
#[must_use]
pub fn day_end(t: NaiveDateTime) -> NaiveDateTime {
    add_days(day_begin(t), 1)
}

/// Midnight at the start of the week containing `t`, weeks starting on `week_start`.
#[must_use]
pub fn week_begin(t: NaiveDateTime, week_start: Weekday) -> NaiveDateTime {
    let current = i64::from(t.weekday().num_days_from_monday());
    let start = i64::from(week_start.to_chrono().num_days_from_monday());
    add_days(day_begin(t), -(current - start).rem_euclid(7))
}

/// Midnight at the start of the following week.
#[must_use]
pub fn week_end(t: NaiveDateTime, week_start: Weekday) -> NaiveDateTime {
    add_days(week_begin(t, week_start), 7)
}

/// Midnight on the first of `t`'s month.
#[must_use]
pub fn month_begin(t: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(t.year(), t.month(), 1)
        .map_or_else(|| day_begin(t), |d| d.and_time(NaiveTime::MIN))
}

/// Midnight on the first of the following month.
#[must_use]
pub fn month_end(t: NaiveDateTime) -> NaiveDateTime {
    add_months(month_begin(t), 1)
}

/// Midnight on January 1st of `t`'s year.
#[must_use]
pub fn year_begin(t: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(t.year(), 1, 1)
        .map_or_else(|| day_begin(t), |d| d.and_time(NaiveTime::MIN))
}

/// Midnight on January 1st of the following year.
#[must_use]
pub fn year_end(t: NaiveDateTime) -> NaiveDateTime {
    add_years(year_begin(t), 1)
}
