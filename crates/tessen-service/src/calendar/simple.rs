//! Recognizes recurrences an editor can show with basic controls.
//!
//! A "simple" recurrence is one rule repeating every N days, N weeks on a
//! set of weekdays, N months on the first or last day or the Nth weekday, or
//! N years on the start date.

use tessen_rfc::rfc::ical::core::{Frequency, RRule};

/// Classifies the recurrence of a component.
///
/// True when there is no recurrence at all, or exactly one rule that
/// [`is_simple_rule`] accepts and no exception rules, exception dates or
/// recurrence dates.
#[must_use]
pub fn has_simple_recurrence(
    rrules: &[RRule],
    exrule_count: usize,
    exdate_count: usize,
    rdate_count: usize,
) -> bool {
    if rrules.is_empty() && rdate_count == 0 {
        return true;
    }
    match rrules {
        [rule] if exrule_count == 0 && exdate_count == 0 && rdate_count == 0 => {
            is_simple_rule(rule)
        }
        _ => false,
    }
}

/// Classifies a single rule.
#[must_use]
pub fn is_simple_rule(rule: &RRule) -> bool {
    let Some(freq) = rule.freq else {
        return false;
    };
    if !freq.is_daily_or_coarser()
        || !rule.by_second.is_empty()
        || !rule.by_minute.is_empty()
        || !rule.by_hour.is_empty()
    {
        return false;
    }

    match freq {
        Frequency::Daily => {
            rule.by_day.is_empty()
                && rule.by_monthday.is_empty()
                && rule.by_yearday.is_empty()
                && rule.by_weekno.is_empty()
                && rule.by_month.is_empty()
                && rule.by_setpos.is_empty()
        }
        Frequency::Weekly => {
            rule.by_monthday.is_empty()
                && rule.by_yearday.is_empty()
                && rule.by_weekno.is_empty()
                && rule.by_month.is_empty()
                && rule.by_setpos.is_empty()
                && rule.by_day.iter().all(|d| d.ordinal.is_none())
        }
        Frequency::Monthly => is_simple_monthly(rule),
        Frequency::Yearly => {
            rule.by_day.is_empty()
                && rule.by_monthday.is_empty()
                && rule.by_yearday.is_empty()
                && rule.by_weekno.is_empty()
                && rule.by_month.is_empty()
                && rule.by_setpos.is_empty()
        }
        Frequency::Secondly | Frequency::Minutely | Frequency::Hourly => false,
    }
}

fn is_simple_monthly(rule: &RRule) -> bool {
    if !rule.by_yearday.is_empty()
        || !rule.by_weekno.is_empty()
        || !rule.by_month.is_empty()
        || rule.by_setpos.len() > 1
    {
        return false;
    }

    match (rule.by_monthday.as_slice(), rule.by_day.as_slice()) {
        // First or last day of the month.
        ([day], []) => rule.by_setpos.is_empty() && matches!(*day, 1 | -1),
        // Nth weekday of the month, either as `2TU` or as `TU` with
        // `BYSETPOS=2`. Some clients only write the second form.
        ([], [weekday]) => match (weekday.ordinal, rule.by_setpos.as_slice()) {
            (Some(n), []) => (1..=5).contains(&n),
            (None, [pos]) => matches!(*pos, 1..=5 | -1),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use tessen_rfc::rfc::ical::core::{Weekday, WeekdayNum};

    use super::*;

    #[test]
    fn no_recurrence_is_simple() {
        assert!(has_simple_recurrence(&[], 0, 0, 0));
    }

    #[test]
    fn daily_interval() {
        assert!(is_simple_rule(&RRule::daily().with_interval(2)));
        assert!(!is_simple_rule(&RRule::daily().with_by_month(vec![3])));
    }

    #[test]
    fn weekly_on_weekdays() {
        let rule = RRule::weekly().with_by_day(vec![
            WeekdayNum::every(Weekday::Tuesday),
            WeekdayNum::every(Weekday::Thursday),
        ]);
        assert!(is_simple_rule(&rule));

        let ordinal = RRule::weekly().with_by_day(vec![WeekdayNum::nth(1, Weekday::Monday)]);
        assert!(!is_simple_rule(&ordinal));
    }

    #[test]
    fn monthly_nth_weekday() {
        let rule = RRule::monthly().with_by_day(vec![WeekdayNum::nth(2, Weekday::Tuesday)]);
        assert!(is_simple_rule(&rule));

        let sixth = RRule::monthly().with_by_day(vec![WeekdayNum::nth(6, Weekday::Tuesday)]);
        assert!(!is_simple_rule(&sixth));
    }

    #[test]
    fn monthly_setpos_pairing() {
        let paired = RRule::monthly()
            .with_by_day(vec![WeekdayNum::every(Weekday::Friday)])
            .with_by_setpos(vec![-1]);
        assert!(is_simple_rule(&paired));

        let both = RRule::monthly()
            .with_by_day(vec![WeekdayNum::nth(2, Weekday::Friday)])
            .with_by_setpos(vec![2]);
        assert!(!is_simple_rule(&both));

        let unpaired = RRule::monthly().with_by_day(vec![WeekdayNum::every(Weekday::Friday)]);
        assert!(!is_simple_rule(&unpaired));
    }

    #[test]
    fn monthly_first_or_last_day() {
        assert!(is_simple_rule(&RRule::monthly().with_by_monthday(vec![1])));
        assert!(is_simple_rule(&RRule::monthly().with_by_monthday(vec![-1])));
        assert!(!is_simple_rule(&RRule::monthly().with_by_monthday(vec![15])));
        assert!(!is_simple_rule(&RRule::monthly()));
    }

    #[test]
    fn yearly_with_month_is_not_simple() {
        assert!(is_simple_rule(&RRule::yearly()));
        assert!(!is_simple_rule(&RRule::yearly().with_by_month(vec![6])));
    }

    #[test]
    fn extras_disqualify() {
        let rules = [RRule::daily()];
        assert!(has_simple_recurrence(&rules, 0, 0, 0));
        assert!(!has_simple_recurrence(&rules, 0, 1, 0));
        assert!(!has_simple_recurrence(&rules, 1, 0, 0));
        assert!(!has_simple_recurrence(&rules, 0, 0, 1));
        assert!(!has_simple_recurrence(&[RRule::daily(), RRule::weekly()], 0, 0, 0));
        assert!(!has_simple_recurrence(&[], 0, 0, 2));
    }

    #[test]
    fn sub_daily_is_not_simple() {
        assert!(!is_simple_rule(&RRule::with_freq(Frequency::Hourly)));
        assert!(!is_simple_rule(&RRule::new()));
    }
}
