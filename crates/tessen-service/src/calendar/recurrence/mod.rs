//! Occurrence expansion.
//!
//! A [`RecurrenceSet`] is the recurrence data of one component: start,
//! length, rules, exception rules and dates, and extra recurrence dates.
//! Expansion works on wall-clock values, so a 09:00 meeting stays at 09:00
//! on both sides of a DST change.
//!
//! ## Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//!
//! use chrono::{NaiveDate, TimeDelta};
//! use tessen_rfc::rfc::ical::core::RRule;
//! use tessen_service::calendar::{RecurrenceSet, Window};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .and_then(|d| d.and_hms_opt(9, 0, 0))
//!     .unwrap();
//! let set = RecurrenceSet::new(start, TimeDelta::hours(1)).with_rrule(RRule::daily());
//!
//! let mut starts = Vec::new();
//! set.generate_instances(Window::unbounded(), |occ| {
//!     starts.push(occ.start);
//!     if starts.len() == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
//! });
//! assert_eq!(starts.len(), 3);
//! ```

mod rule;

use std::iter::Peekable;
use std::ops::ControlFlow;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tessen_core::constants::DEFAULT_MAX_ITERATIONS;
use tessen_rfc::rfc::ical::core::RRule;
use tessen_rfc::rfc::ical::time::{add_duration, day_end};

use self::rule::RuleIter;
use super::component::{CalComponent, CalKind};
use super::types::PeriodEnd;

/// One concrete instance of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Occurrence {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Half-open range `[start, end)`; no end means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl Window {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::new(start, Some(end))
    }

    #[must_use]
    pub const fn starting_at(start: NaiveDateTime) -> Self {
        Self::new(start, None)
    }

    /// Covers every representable time.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(NaiveDateTime::MIN, None)
    }

    /// Whether an occurrence intersects the window.
    ///
    /// A zero-length occurrence exactly at the window start counts.
    #[must_use]
    pub fn overlaps(&self, occurrence: &Occurrence) -> bool {
        self.end.is_none_or(|end| occurrence.start < end)
            && (occurrence.end > self.start || occurrence.start >= self.start)
    }

    fn is_past(&self, start: NaiveDateTime) -> bool {
        self.end.is_some_and(|end| start >= end)
    }
}

/// Recurrence data of one component, ready for expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSet {
    dtstart: NaiveDateTime,
    span: TimeDelta,
    rrules: Vec<RRule>,
    exrules: Vec<RRule>,
    exdates: Vec<NaiveDate>,
    rdates: Vec<Occurrence>,
    max_iterations: u64,
}

impl RecurrenceSet {
    /// Creates a set with a single instance of length `span` at `dtstart`.
    #[must_use]
    pub fn new(dtstart: NaiveDateTime, span: TimeDelta) -> Self {
        Self {
            dtstart,
            span,
            rrules: Vec::new(),
            exrules: Vec::new(),
            exdates: Vec::new(),
            rdates: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_rrule(mut self, rule: RRule) -> Self {
        self.rrules.push(rule);
        self
    }

    #[must_use]
    pub fn with_exrule(mut self, rule: RRule) -> Self {
        self.exrules.push(rule);
        self
    }

    /// Suppresses every occurrence starting on `date`.
    #[must_use]
    pub fn with_exdate(mut self, date: NaiveDate) -> Self {
        if let Err(pos) = self.exdates.binary_search(&date) {
            self.exdates.insert(pos, date);
        }
        self
    }

    /// Adds an extra instance; without `end` it gets the master length.
    #[must_use]
    pub fn with_rdate(mut self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        let end = end.unwrap_or_else(|| self.end_for(start));
        let occurrence = Occurrence { start, end };
        let pos = self.rdates.partition_point(|o| o <= &occurrence);
        self.rdates.insert(pos, occurrence);
        self
    }

    /// Caps candidates examined per rule; `0` disables the cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Collects the recurrence data of a component.
    ///
    /// Returns `None` when the component has no DTSTART. The instance length
    /// comes from DTEND (events), DUE (to-dos) or DURATION; without any of
    /// them a date-only start lasts one day and a date-time start is instant.
    #[must_use]
    pub fn from_component(component: &CalComponent) -> Option<Self> {
        let dtstart = component.get_dtstart()?;
        let end = match component.kind() {
            CalKind::Event => component.get_dtend(),
            CalKind::Todo => component.get_due(),
            _ => component
                .get_duration()
                .map(|d| dtstart.with_value(add_duration(dtstart.value, &d))),
        };
        let span = match end {
            Some(end) if end.value >= dtstart.value => end.value - dtstart.value,
            Some(end) => {
                tracing::debug!(
                    uid = ?component.get_uid(),
                    start = %dtstart,
                    end = %end,
                    "End precedes start, treating instances as instant"
                );
                TimeDelta::zero()
            }
            None if dtstart.is_date => TimeDelta::days(1),
            None => TimeDelta::zero(),
        };

        let mut set = Self::new(dtstart.value, span)
            .with_max_iterations(component.max_iterations());
        set.rrules = component.get_rrules();
        set.exrules = component.get_exrules();
        for exdate in component.get_exdates() {
            set = set.with_exdate(exdate.value.date());
        }
        for period in component.get_rdates() {
            let start = period.start.value;
            let end = match period.end {
                None => None,
                Some(PeriodEnd::DateTime(end)) => Some(end),
                Some(PeriodEnd::Duration(duration)) => Some(add_duration(start, &duration)),
            };
            set = set.with_rdate(start, end);
        }
        Some(set)
    }

    #[must_use]
    pub fn dtstart(&self) -> NaiveDateTime {
        self.dtstart
    }

    /// Length of each rule-generated instance.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.span
    }

    #[must_use]
    pub fn rrules(&self) -> &[RRule] {
        &self.rrules
    }

    fn end_for(&self, start: NaiveDateTime) -> NaiveDateTime {
        start.checked_add_signed(self.span).unwrap_or(NaiveDateTime::MAX)
    }

    /// Lazily expands the set over `window`, in chronological order.
    #[must_use]
    pub fn occurrences(&self, window: Window) -> Occurrences {
        Occurrences::new(self.clone(), window)
    }

    /// Feeds each occurrence in `window` to `f` until it breaks.
    ///
    /// Returns the number of occurrences delivered. With an unbounded window,
    /// an unbounded rule and a callback that never breaks, this only ends at
    /// the iteration cap.
    pub fn generate_instances<F>(&self, window: Window, mut f: F) -> usize
    where
        F: FnMut(&Occurrence) -> ControlFlow<()>,
    {
        let mut delivered = 0;
        for occurrence in self.occurrences(window) {
            delivered += 1;
            if f(&occurrence).is_break() {
                break;
            }
        }
        delivered
    }

    /// End of the day on which the `count`th occurrence ends.
    ///
    /// Falls back to the last occurrence when the set runs out first;
    /// `None` for `count == 0` or an empty set.
    #[must_use]
    pub fn end_date_from_count(&self, count: u32) -> Option<NaiveDateTime> {
        if count == 0 {
            return None;
        }
        let mut seen = 0;
        let mut last_end = None;
        self.generate_instances(Window::unbounded(), |occurrence| {
            seen += 1;
            last_end = Some(occurrence.end);
            if seen >= count {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        last_end.map(day_end)
    }
}

enum Source {
    Master,
    Rule(usize),
    Rdate,
}

/// Restartable occurrence iterator over one window.
#[derive(Debug, Clone)]
pub struct Occurrences {
    set: RecurrenceSet,
    window: Window,
    master: Option<NaiveDateTime>,
    rules: Vec<Peekable<RuleIter>>,
    exrules: Vec<Peekable<RuleIter>>,
    next_rdate: usize,
    last_start: Option<NaiveDateTime>,
    finished: bool,
}

impl Occurrences {
    fn new(set: RecurrenceSet, window: Window) -> Self {
        let mut occurrences = Self {
            set,
            window,
            master: None,
            rules: Vec::new(),
            exrules: Vec::new(),
            next_rdate: 0,
            last_start: None,
            finished: false,
        };
        occurrences.restart();
        occurrences
    }

    /// Rewinds to the first occurrence.
    pub fn restart(&mut self) {
        let set = &self.set;
        let expand = |rule: &RRule| RuleIter::new(rule, set.dtstart, set.max_iterations).peekable();
        self.rules = set.rrules.iter().map(expand).collect();
        self.exrules = set.exrules.iter().map(expand).collect();
        // Without rules DTSTART itself is the master instance.
        self.master = set.rrules.is_empty().then_some(set.dtstart);
        self.next_rdate = 0;
        self.last_start = None;
        self.finished = false;
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Pops the earliest pending instance across all sources.
    fn next_candidate(&mut self) -> Option<Occurrence> {
        let mut best: Option<(Source, NaiveDateTime)> = self.master.map(|m| (Source::Master, m));
        for (i, rule) in self.rules.iter_mut().enumerate() {
            if let Some(&start) = rule.peek()
                && best.as_ref().is_none_or(|(_, b)| start < *b)
            {
                best = Some((Source::Rule(i), start));
            }
        }
        if let Some(rdate) = self.set.rdates.get(self.next_rdate)
            && best.as_ref().is_none_or(|(_, b)| rdate.start < *b)
        {
            best = Some((Source::Rdate, rdate.start));
        }

        let (source, start) = best?;
        match source {
            Source::Master => {
                self.master = None;
                Some(Occurrence {
                    start,
                    end: self.set.end_for(start),
                })
            }
            Source::Rule(i) => {
                self.rules[i].next();
                Some(Occurrence {
                    start,
                    end: self.set.end_for(start),
                })
            }
            Source::Rdate => {
                let occurrence = self.set.rdates.get(self.next_rdate).copied();
                self.next_rdate += 1;
                occurrence
            }
        }
    }

    fn is_excluded(&mut self, start: NaiveDateTime) -> bool {
        let date = start.date();
        if self.set.exdates.binary_search(&date).is_ok() {
            return true;
        }
        let mut excluded = false;
        for exrule in &mut self.exrules {
            while exrule.next_if(|t| t.date() < date).is_some() {}
            if exrule.peek().is_some_and(|t| t.date() == date) {
                excluded = true;
            }
        }
        excluded
    }
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let Some(occurrence) = self.next_candidate() else {
                self.finished = true;
                break;
            };
            if self.last_start == Some(occurrence.start) {
                continue;
            }
            self.last_start = Some(occurrence.start);

            if self.window.is_past(occurrence.start) {
                self.finished = true;
                break;
            }
            if self.is_excluded(occurrence.start) {
                tracing::trace!(start = %occurrence.start, "Occurrence excluded");
                continue;
            }
            if self.window.overlaps(&occurrence) {
                return Some(occurrence);
            }
        }
        None
    }
}
