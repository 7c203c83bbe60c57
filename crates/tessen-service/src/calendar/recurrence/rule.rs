//! Candidate generation for a single recurrence rule.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tessen_rfc::rfc::ical::core::{Frequency, RRule, RRuleUntil, Weekday};
use tessen_rfc::rfc::ical::time::{
    add_days, add_months, add_years, day_end, days_in_month, is_leap_year,
};

/// How the cursor moves and which dates it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Daily {
        interval: i64,
    },
    /// Walks day by day, jumping over skipped weeks after the week's last day.
    Weekly {
        interval: i64,
        days: [bool; 7],
        last_of_week: chrono::Weekday,
    },
    /// Nth weekday of the month.
    MonthlyByPosition {
        interval: i32,
        weekday: chrono::Weekday,
        nth: u32,
    },
    /// Fixed day of the month; negative counts from the month's end.
    MonthlyByDay {
        interval: i32,
        day: i32,
    },
    /// Fixed day in each selected month; walks month by month.
    YearlyByDate {
        interval: i32,
        months: [bool; 12],
        day: u32,
    },
    YearlyByDay {
        interval: i32,
        yearday: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Until {
    Inclusive(NaiveDateTime),
    Before(NaiveDateTime),
}

enum Step {
    Emit(NaiveDateTime),
    Skip,
    Stop,
}

/// Lazily yields the start times a rule produces, in order.
///
/// Candidates before `dtstart` are dropped. COUNT counts every candidate
/// yielded here, including ones exception dates later suppress.
#[derive(Debug, Clone)]
pub(super) struct RuleIter {
    plan: Option<Plan>,
    rule: String,
    dtstart: NaiveDateTime,
    cursor: NaiveDateTime,
    until: Option<Until>,
    remaining: Option<u32>,
    iterations: u64,
    max_iterations: u64,
}

impl RuleIter {
    pub(super) fn new(rule: &RRule, dtstart: NaiveDateTime, max_iterations: u64) -> Self {
        let plan = plan_for(rule, dtstart);
        let cursor = match plan {
            Some(Plan::MonthlyByPosition { .. } | Plan::MonthlyByDay { .. }) => {
                first_of_month(dtstart)
            }
            Some(Plan::YearlyByDate { .. } | Plan::YearlyByDay { .. }) => first_of_year(dtstart),
            _ => dtstart,
        };
        let until = rule.until.as_ref().and_then(|until| match until {
            RRuleUntil::Date(d) => d
                .to_naive()
                .map(|d| Until::Before(day_end(d.and_time(NaiveTime::MIN)))),
            RRuleUntil::DateTime(dt) => dt.to_naive().map(Until::Inclusive),
        });

        Self {
            plan,
            rule: rule.to_string(),
            dtstart,
            cursor,
            until,
            remaining: rule.count.filter(|c| *c > 0),
            iterations: 0,
            max_iterations,
        }
    }

    fn until_allows(&self, candidate: NaiveDateTime) -> bool {
        match self.until {
            None => true,
            Some(Until::Inclusive(limit)) => candidate <= limit,
            Some(Until::Before(limit)) => candidate < limit,
        }
    }

    /// Moves the cursor to `next`, stopping the plan if arithmetic saturated.
    fn advance_to(&mut self, next: NaiveDateTime) {
        if next <= self.cursor {
            tracing::debug!(rule = %self.rule, "Recurrence cursor reached the end of time");
            self.plan = None;
        }
        self.cursor = next;
    }

    fn step(&mut self) -> Step {
        let Some(plan) = self.plan else {
            return Step::Stop;
        };
        let current = self.cursor;

        match plan {
            Plan::Daily { interval } => {
                self.advance_to(add_days(current, interval));
                Step::Emit(current)
            }
            Plan::Weekly {
                interval,
                days,
                last_of_week,
            } => {
                let weekday = current.weekday();
                let next = if weekday == last_of_week {
                    add_days(current, (interval - 1) * 7 + 1)
                } else {
                    add_days(current, 1)
                };
                self.advance_to(next);
                if days[weekday.num_days_from_monday() as usize] {
                    Step::Emit(current)
                } else {
                    Step::Skip
                }
            }
            Plan::MonthlyByPosition {
                interval,
                weekday,
                nth,
            } => {
                self.advance_to(add_months(current, interval));
                let offset = (weekday.num_days_from_monday() + 7
                    - current.weekday().num_days_from_monday())
                    % 7;
                let day = 1 + offset + (nth - 1) * 7;
                if day <= days_in_month(current.year(), current.month()) {
                    Step::Emit(add_days(current, i64::from(day - 1)))
                } else {
                    tracing::trace!(rule = %self.rule, month = %current.date(), "Month lacks the position");
                    Step::Skip
                }
            }
            Plan::MonthlyByDay { interval, day } => {
                self.advance_to(add_months(current, interval));
                let length = i32::try_from(days_in_month(current.year(), current.month()))
                    .unwrap_or(31);
                let actual = if day > 0 { day } else { length + day + 1 };
                if (1..=length).contains(&actual) {
                    Step::Emit(add_days(current, i64::from(actual - 1)))
                } else {
                    tracing::trace!(rule = %self.rule, month = %current.date(), "Month lacks the day");
                    Step::Skip
                }
            }
            Plan::YearlyByDate {
                interval,
                months,
                day,
            } => {
                let month = current.month();
                let next = if month == 12 {
                    add_months(current, interval.saturating_sub(1).saturating_mul(12).saturating_add(1))
                } else {
                    add_months(current, 1)
                };
                self.advance_to(next);
                if !months[month as usize - 1] {
                    return Step::Skip;
                }
                match NaiveDate::from_ymd_opt(current.year(), month, day) {
                    Some(date) => Step::Emit(date.and_time(current.time())),
                    None => Step::Skip,
                }
            }
            Plan::YearlyByDay { interval, yearday } => {
                self.advance_to(add_years(current, interval));
                let length = if is_leap_year(current.year()) { 366 } else { 365 };
                let actual = if yearday > 0 {
                    yearday
                } else {
                    length + yearday + 1
                };
                if (1..=length).contains(&actual) {
                    Step::Emit(add_days(current, i64::from(actual - 1)))
                } else {
                    Step::Skip
                }
            }
        }
    }
}

impl Iterator for RuleIter {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            self.plan?;

            self.iterations += 1;
            if self.max_iterations > 0 && self.iterations > self.max_iterations {
                tracing::warn!(
                    rule = %self.rule,
                    max_iterations = self.max_iterations,
                    "Recurrence expansion hit the iteration limit"
                );
                self.plan = None;
                return None;
            }

            let candidate = match self.step() {
                Step::Emit(candidate) => candidate,
                Step::Skip => continue,
                Step::Stop => return None,
            };
            if candidate < self.dtstart {
                continue;
            }
            if !self.until_allows(candidate) {
                self.plan = None;
                return None;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            return Some(candidate);
        }
    }
}

fn first_of_month(t: NaiveDateTime) -> NaiveDateTime {
    t.with_day(1).unwrap_or(t)
}

fn first_of_year(t: NaiveDateTime) -> NaiveDateTime {
    t.with_ordinal(1).unwrap_or(t)
}

fn narrow_interval(rule: &RRule, interval: u32) -> Option<i32> {
    let narrowed = i32::try_from(interval).ok();
    if narrowed.is_none() {
        tracing::warn!(rule = %rule, "Recurrence interval too large");
    }
    narrowed
}

/// Logs BY list entries past the first, which monthly and yearly plans drop.
fn note_ignored<T>(rule: &RRule, part: &'static str, items: &[T]) {
    if items.len() > 1 {
        tracing::warn!(
            rule = %rule,
            part,
            ignored = items.len() - 1,
            "Only the first entry of this BY list is expanded"
        );
    }
}

/// Chooses the expansion plan, or `None` when the rule cannot be expanded.
#[expect(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "Month days and positions are range checked before narrowing"
)]
fn plan_for(rule: &RRule, dtstart: NaiveDateTime) -> Option<Plan> {
    let Some(freq) = rule.freq else {
        tracing::warn!(rule = %rule, "Recurrence rule has no FREQ, not expanding");
        return None;
    };
    let interval = rule.interval_or_default();
    if interval == 0 {
        tracing::warn!(rule = %rule, "Recurrence rule has a zero INTERVAL, not expanding");
        return None;
    }

    match freq {
        Frequency::Secondly | Frequency::Minutely | Frequency::Hourly => {
            tracing::warn!(rule = %rule, "Sub-daily recurrence is not expanded");
            None
        }
        Frequency::Daily => Some(Plan::Daily {
            interval: i64::from(interval),
        }),
        Frequency::Weekly => {
            let mut days = [false; 7];
            if rule.by_day.is_empty() {
                days[dtstart.weekday().num_days_from_monday() as usize] = true;
            }
            for entry in &rule.by_day {
                days[entry.weekday.to_chrono().num_days_from_monday() as usize] = true;
            }
            let week_start = rule.wkst.unwrap_or(Weekday::Monday).to_chrono();
            Some(Plan::Weekly {
                interval: i64::from(interval),
                days,
                last_of_week: week_start.pred(),
            })
        }
        Frequency::Monthly => {
            let interval = narrow_interval(rule, interval)?;
            note_ignored(rule, "BYDAY", &rule.by_day);
            note_ignored(rule, "BYSETPOS", &rule.by_setpos);
            note_ignored(rule, "BYMONTHDAY", &rule.by_monthday);
            if let Some(entry) = rule.by_day.first() {
                let position = entry
                    .ordinal
                    .map(i16::from)
                    .or_else(|| rule.by_setpos.first().copied());
                match position {
                    Some(nth @ 1..=5) => Some(Plan::MonthlyByPosition {
                        interval,
                        weekday: entry.weekday.to_chrono(),
                        nth: nth as u32,
                    }),
                    Some(nth) if nth > 5 => {
                        tracing::warn!(rule = %rule, nth, "No month has this weekday position");
                        None
                    }
                    _ => {
                        tracing::warn!(
                            rule = %rule,
                            "Only positive monthly weekday positions are supported"
                        );
                        None
                    }
                }
            } else {
                let day = rule
                    .by_monthday
                    .first()
                    .map_or(dtstart.day() as i32, |d| i32::from(*d));
                if day == 0 || day.abs() > 31 {
                    tracing::warn!(rule = %rule, day, "Invalid monthly day");
                    return None;
                }
                Some(Plan::MonthlyByDay { interval, day })
            }
        }
        Frequency::Yearly => {
            let interval = narrow_interval(rule, interval)?;
            if !rule.by_day.is_empty() || !rule.by_weekno.is_empty() || !rule.by_setpos.is_empty()
            {
                tracing::debug!(rule = %rule, "Ignoring yearly filters finer than month or day");
            }
            note_ignored(rule, "BYYEARDAY", &rule.by_yearday);
            note_ignored(rule, "BYMONTHDAY", &rule.by_monthday);
            if let Some(&yearday) = rule.by_yearday.first() {
                if yearday == 0 || yearday.abs() > 366 {
                    tracing::warn!(rule = %rule, yearday, "Invalid yearly day");
                    return None;
                }
                return Some(Plan::YearlyByDay {
                    interval,
                    yearday: i32::from(yearday),
                });
            }
            let mut months = [false; 12];
            if rule.by_month.is_empty() {
                months[dtstart.month0() as usize] = true;
            }
            for &month in &rule.by_month {
                match month {
                    1..=12 => months[usize::from(month) - 1] = true,
                    _ => tracing::debug!(rule = %rule, month, "Ignoring invalid BYMONTH"),
                }
            }
            let day = rule
                .by_monthday
                .first()
                .map_or(dtstart.day() as i32, |d| i32::from(*d));
            // 2000 is a leap year, so Feb 29 passes and is skipped later in
            // other years.
            let occurs = day >= 1
                && (1..=12u32).any(|m| {
                    months[m as usize - 1]
                        && NaiveDate::from_ymd_opt(2000, m, day as u32).is_some()
                });
            if !occurs {
                tracing::warn!(rule = %rule, day, "Yearly date never occurs");
                return None;
            }
            Some(Plan::YearlyByDate {
                interval,
                months,
                day: day as u32,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use tessen_rfc::rfc::ical::core::{Date, WeekdayNum};

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    fn take(rule: &RRule, dtstart: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
        RuleIter::new(rule, dtstart, 0).take(n).collect()
    }

    #[test_log::test]
    fn daily_interval() {
        let dates = take(&RRule::daily().with_interval(3), at(2024, 1, 30, 9), 3);
        assert_eq!(dates, vec![at(2024, 1, 30, 9), at(2024, 2, 2, 9), at(2024, 2, 5, 9)]);
    }

    #[test_log::test]
    fn weekly_biweekly_tue_thu() {
        // 2024-01-02 is a Tuesday
        let rule = RRule::weekly().with_interval(2).with_by_day(vec![
            WeekdayNum::every(Weekday::Tuesday),
            WeekdayNum::every(Weekday::Thursday),
        ]);
        let dates = take(&rule, at(2024, 1, 2, 9), 4);
        assert_eq!(
            dates,
            vec![at(2024, 1, 2, 9), at(2024, 1, 4, 9), at(2024, 1, 16, 9), at(2024, 1, 18, 9)]
        );
    }

    #[test_log::test]
    fn monthly_extra_byday_entries_are_dropped() {
        let rule = RRule::monthly().with_by_day(vec![
            WeekdayNum::nth(1, Weekday::Monday),
            WeekdayNum::nth(3, Weekday::Monday),
        ]);
        assert!(matches!(
            plan_for(&rule, at(2024, 1, 1, 9)),
            Some(Plan::MonthlyByPosition { nth: 1, .. })
        ));
        let dates = take(&rule, at(2024, 1, 1, 9), 3);
        assert_eq!(dates, vec![at(2024, 1, 1, 9), at(2024, 2, 5, 9), at(2024, 3, 4, 9)]);
    }

    #[test_log::test]
    fn weekly_respects_week_start() {
        // Biweekly on SU and MO, starting Monday 2024-01-01. With a Sunday
        // week start the following Sunday begins the skipped week.
        let rule = RRule::weekly()
            .with_interval(2)
            .with_wkst(Weekday::Sunday)
            .with_by_day(vec![
                WeekdayNum::every(Weekday::Sunday),
                WeekdayNum::every(Weekday::Monday),
            ]);
        let dates = take(&rule, at(2024, 1, 1, 9), 3);
        assert_eq!(dates, vec![at(2024, 1, 1, 9), at(2024, 1, 14, 9), at(2024, 1, 15, 9)]);
    }

    #[test_log::test]
    fn monthly_second_tuesday() {
        let rule = RRule::monthly().with_by_day(vec![WeekdayNum::nth(2, Weekday::Tuesday)]);
        let dates = take(&rule, at(2024, 1, 1, 9), 3);
        assert_eq!(dates, vec![at(2024, 1, 9, 9), at(2024, 2, 13, 9), at(2024, 3, 12, 9)]);
    }

    #[test_log::test]
    fn monthly_fifth_friday_skips_short_months() {
        let rule = RRule::monthly().with_by_day(vec![WeekdayNum::nth(5, Weekday::Friday)]);
        let dates = take(&rule, at(2024, 1, 1, 9), 2);
        // Fifth Fridays in 2024: Mar 29, May 31
        assert_eq!(dates, vec![at(2024, 3, 29, 9), at(2024, 5, 31, 9)]);
    }

    #[test_log::test]
    fn monthly_setpos_is_position() {
        let rule = RRule::monthly()
            .with_by_day(vec![WeekdayNum::every(Weekday::Monday)])
            .with_by_setpos(vec![1]);
        assert_eq!(take(&rule, at(2024, 1, 1, 9), 2), vec![at(2024, 1, 1, 9), at(2024, 2, 5, 9)]);
    }

    #[test_log::test]
    fn monthly_negative_position_aborts() {
        let rule = RRule::monthly().with_by_day(vec![WeekdayNum::nth(-1, Weekday::Friday)]);
        assert!(take(&rule, at(2024, 1, 1, 9), 3).is_empty());
    }

    #[test_log::test]
    fn monthly_31st_skips() {
        let rule = RRule::monthly().with_by_monthday(vec![31]);
        let dates = take(&rule, at(2024, 1, 1, 9), 3);
        assert_eq!(dates, vec![at(2024, 1, 31, 9), at(2024, 3, 31, 9), at(2024, 5, 31, 9)]);
    }

    #[test_log::test]
    fn monthly_last_day() {
        let rule = RRule::monthly().with_by_monthday(vec![-1]);
        let dates = take(&rule, at(2024, 1, 1, 9), 2);
        assert_eq!(dates, vec![at(2024, 1, 31, 9), at(2024, 2, 29, 9)]);
    }

    #[test_log::test]
    fn yearly_leap_day_skips() {
        let dates = take(&RRule::yearly(), at(2024, 2, 29, 9), 2);
        assert_eq!(dates, vec![at(2024, 2, 29, 9), at(2028, 2, 29, 9)]);
    }

    #[test_log::test]
    fn yearly_by_month_and_yearday() {
        let by_month = RRule::yearly().with_by_month(vec![7]);
        assert_eq!(take(&by_month, at(2024, 3, 4, 9), 2), vec![at(2024, 7, 4, 9), at(2025, 7, 4, 9)]);

        let quarterly = RRule::yearly().with_interval(2).with_by_month(vec![1, 4]);
        assert_eq!(
            take(&quarterly, at(2024, 1, 10, 9), 4),
            vec![at(2024, 1, 10, 9), at(2024, 4, 10, 9), at(2026, 1, 10, 9), at(2026, 4, 10, 9)]
        );

        let mut by_yearday = RRule::yearly();
        by_yearday.by_yearday = vec![-1];
        assert_eq!(
            take(&by_yearday, at(2024, 1, 1, 0), 2),
            vec![at(2024, 12, 31, 0), at(2025, 12, 31, 0)]
        );
    }

    #[test_log::test]
    fn count_and_until() {
        let counted = RuleIter::new(&RRule::daily().with_count(3), at(2024, 1, 1, 9), 0);
        assert_eq!(counted.count(), 3);

        // A DATE until covers the whole day.
        let until = RRule::daily().with_until_date(Date::new(2024, 1, 3));
        let dates: Vec<_> = RuleIter::new(&until, at(2024, 1, 1, 9), 0).collect();
        assert_eq!(dates.last(), Some(&at(2024, 1, 3, 9)));
        assert_eq!(dates.len(), 3);
    }

    #[test_log::test]
    fn unsupported_shapes_yield_nothing() {
        assert_eq!(RuleIter::new(&RRule::new(), at(2024, 1, 1, 9), 0).count(), 0);
        assert_eq!(RuleIter::new(&RRule::with_freq(Frequency::Hourly), at(2024, 1, 1, 9), 0).count(), 0);
        assert_eq!(RuleIter::new(&RRule::daily().with_interval(0), at(2024, 1, 1, 9), 0).count(), 0);
    }

    #[test_log::test]
    fn iteration_limit_stops_expansion() {
        let rule = RRule::yearly().with_by_month(vec![2]);
        // Twelve steps a year from a leap-day start; Feb 29 of 2028 is step 50.
        let dates: Vec<_> = RuleIter::new(&rule, at(2024, 2, 29, 9), 50).collect();
        assert_eq!(dates, vec![at(2024, 2, 29, 9), at(2028, 2, 29, 9)]);
    }
}
