//! Cached typed view over one calendar component.
//!
//! A [`CalComponent`] owns its property container. Reads go through a
//! [`PropertyIndex`] of property positions; every write updates the
//! container at once and rebuilds the index. VALARM children are moved out
//! into typed [`CalAlarm`]s on adoption and embedded again on export.
//!
//! Changes to scheduling-relevant properties (start, end, due, duration,
//! status, recurrence and exceptions) mark the component as needing a
//! SEQUENCE increment. [`CalComponent::commit_sequence`] applies it and must
//! run before the container is exported.

mod index;

use std::collections::HashMap;
use std::ops::ControlFlow;

use chrono::{DateTime, NaiveDateTime, Utc};
use tessen_core::config::Settings;
use tessen_core::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_UNTITLED_DESCRIPTION};
use tessen_rfc::rfc::ical::core::{
    Component, ComponentKind, Duration, Geo, ICalendar, Property, RRule, Value, names,
};
use tessen_rfc::rfc::ical::time::add_duration;

use self::index::PropertyIndex;
use super::alarm::CalAlarm;
use super::recurrence::{Occurrence, RecurrenceSet, Window};
use super::simple;
use super::types::{
    Attendee, CalDateTime, CalPeriod, CalText, Classification, Organizer, Status, Transparency,
};
use super::uid::UidGenerator;
use super::{ComponentError, ComponentResult};
use crate::error::{ServiceError, ServiceResult};

/// Kinds of component a [`CalComponent`] can wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalKind {
    /// No container.
    #[default]
    None,
    Event,
    Todo,
    Journal,
    FreeBusy,
    Timezone,
}

impl CalKind {
    /// The container kind, `None` for [`CalKind::None`].
    #[must_use]
    pub const fn component_kind(self) -> Option<ComponentKind> {
        match self {
            Self::None => None,
            Self::Event => Some(ComponentKind::Event),
            Self::Todo => Some(ComponentKind::Todo),
            Self::Journal => Some(ComponentKind::Journal),
            Self::FreeBusy => Some(ComponentKind::FreeBusy),
            Self::Timezone => Some(ComponentKind::Timezone),
        }
    }

    /// Maps a container kind, `None` when it cannot be wrapped.
    #[must_use]
    pub const fn from_component_kind(kind: ComponentKind) -> Option<Self> {
        match kind {
            ComponentKind::Event => Some(Self::Event),
            ComponentKind::Todo => Some(Self::Todo),
            ComponentKind::Journal => Some(Self::Journal),
            ComponentKind::FreeBusy => Some(Self::FreeBusy),
            ComponentKind::Timezone => Some(Self::Timezone),
            _ => None,
        }
    }
}

/// A typed, cached calendar component.
#[derive(Debug)]
pub struct CalComponent {
    container: Option<Component>,
    kind: CalKind,
    index: PropertyIndex,
    alarms: Vec<CalAlarm>,
    alarm_index: HashMap<String, usize>,
    needs_sequence_increment: bool,
    uid_generator: UidGenerator,
    untitled_description: String,
    max_iterations: u64,
}

impl Default for CalComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl CalComponent {
    /// Creates an empty component with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            container: None,
            kind: CalKind::None,
            index: PropertyIndex::default(),
            alarms: Vec::new(),
            alarm_index: HashMap::new(),
            needs_sequence_increment: false,
            uid_generator: UidGenerator::default(),
            untitled_description: DEFAULT_UNTITLED_DESCRIPTION.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Creates an empty component configured from `settings`.
    #[must_use]
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            uid_generator: UidGenerator::from_settings(settings),
            untitled_description: settings.alarm.untitled_description.clone(),
            max_iterations: settings.recurrence.max_iterations,
            ..Self::new()
        }
    }

    /// Replaces the generator used for uids and DTSTAMP values.
    #[must_use]
    pub fn with_uid_generator(mut self, uid_generator: UidGenerator) -> Self {
        self.uid_generator = uid_generator;
        self
    }

    /// Wraps `container` in a new component with default settings.
    ///
    /// ## Errors
    ///
    /// Returns `UnsupportedKind` if the container is not an event, to-do,
    /// journal, free/busy or timezone.
    pub fn from_container(container: Component) -> ComponentResult<Self> {
        let mut component = Self::new();
        component.adopt(container)?;
        Ok(component)
    }

    #[must_use]
    pub fn kind(&self) -> CalKind {
        self.kind
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.container.is_some()
    }

    #[must_use]
    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    #[must_use]
    pub fn needs_sequence_increment(&self) -> bool {
        self.needs_sequence_increment
    }

    // ----- lifecycle -----

    fn release(&mut self) {
        self.container = None;
        self.kind = CalKind::None;
        self.index = PropertyIndex::default();
        self.alarms.clear();
        self.alarm_index.clear();
        self.needs_sequence_increment = false;
    }

    /// Takes ownership of `container`, releasing any previous one.
    ///
    /// VALARM children move into the alarm index and a missing UID or
    /// DTSTAMP is synthesized.
    ///
    /// ## Errors
    ///
    /// Returns `UnsupportedKind` for containers that are not an event, to-do,
    /// journal, free/busy or timezone; the component is left empty.
    pub fn adopt(&mut self, container: Component) -> ComponentResult<()> {
        self.release();
        let Some(kind) = container.kind.and_then(CalKind::from_component_kind) else {
            tracing::debug!(name = %container.name, "Refusing to adopt component");
            return Err(ComponentError::UnsupportedKind(container.name));
        };
        self.kind = kind;
        self.container = Some(container);
        self.rescan();
        Ok(())
    }

    /// Replaces the container with a fresh one holding only UID and DTSTAMP.
    ///
    /// [`CalKind::None`] leaves the component empty.
    pub fn initialize(&mut self, kind: CalKind) {
        self.release();
        let Some(component_kind) = kind.component_kind() else {
            return;
        };
        self.kind = kind;
        self.container = Some(Component::new(component_kind));
        self.rescan();
    }

    /// Rebuilds the property index from the container.
    ///
    /// Also adopts VALARM children added through [`Self::container_mut`] and
    /// fills a missing UID or DTSTAMP. Running it twice changes nothing.
    pub fn rescan(&mut self) {
        let Some(container) = self.container.as_mut() else {
            return;
        };
        let embedded = container.take_children_of_kind(ComponentKind::Alarm);
        for child in embedded {
            if let Ok(alarm) = CalAlarm::from_container(child) {
                self.insert_alarm(alarm);
            }
        }
        self.reindex();
        self.ensure_mandatory();
    }

    fn reindex(&mut self) {
        self.index = self
            .container
            .as_ref()
            .map(PropertyIndex::build)
            .unwrap_or_default();
    }

    fn ensure_mandatory(&mut self) {
        let Some(container) = self.container.as_mut() else {
            return;
        };
        let mut filled = false;
        if self.index.uid.is_none() {
            let uid = self.uid_generator.next_uid();
            tracing::debug!(uid = %uid, "Synthesized missing UID");
            container.add_property(Property::text(names::UID, uid));
            filled = true;
        }
        if self.index.dtstamp.is_none() {
            let stamp = CalDateTime::utc(self.uid_generator.now().naive_utc());
            container.add_property(stamp.to_property(names::DTSTAMP));
            filled = true;
        }
        if filled {
            self.reindex();
        }
    }

    /// Generates a new uid from this component's generator.
    #[must_use]
    pub fn gen_uid(&self) -> String {
        self.uid_generator.next_uid()
    }

    /// The container, without the alarms held in the alarm index.
    #[must_use]
    pub fn container(&self) -> Option<&Component> {
        self.container.as_ref()
    }

    /// Direct access to the container. Call [`Self::rescan`] afterwards.
    pub fn container_mut(&mut self) -> Option<&mut Component> {
        self.container.as_mut()
    }

    /// Copies the container with alarms embedded.
    ///
    /// ## Errors
    ///
    /// Returns `SequencePending` if a SEQUENCE increment has not been
    /// committed, `NotInitialized` if there is no container.
    pub fn to_container(&self) -> ComponentResult<Component> {
        if self.needs_sequence_increment {
            return Err(ComponentError::SequencePending);
        }
        let mut container = self
            .container
            .clone()
            .ok_or(ComponentError::NotInitialized)?;
        container
            .children
            .extend(self.alarms.iter().map(|a| a.container().clone()));
        Ok(container)
    }

    /// Moves the container out with alarms embedded, leaving this component empty.
    ///
    /// ## Errors
    ///
    /// Same as [`Self::to_container`]; on error nothing is moved.
    pub fn take_container(&mut self) -> ComponentResult<Component> {
        if self.needs_sequence_increment {
            return Err(ComponentError::SequencePending);
        }
        let mut container = self
            .container
            .take()
            .ok_or(ComponentError::NotInitialized)?;
        container
            .children
            .extend(self.alarms.drain(..).map(CalAlarm::into_container));
        self.release();
        Ok(container)
    }

    /// Consumes the component, returning its container with alarms embedded.
    ///
    /// ## Errors
    ///
    /// Same as [`Self::to_container`].
    pub fn into_container(mut self) -> ComponentResult<Component> {
        self.take_container()
    }

    /// Moves child `index` out of `calendar` and adopts it.
    ///
    /// ## Errors
    ///
    /// Returns `NotFound` for a missing child and `UnsupportedKind` for a
    /// child that cannot be wrapped; in both cases `calendar` is unchanged.
    pub fn adopt_from(&mut self, calendar: &mut ICalendar, index: usize) -> ServiceResult<()> {
        let child = calendar
            .root
            .children
            .get(index)
            .ok_or_else(|| ServiceError::NotFound(format!("calendar child {index}")))?;
        if child.kind.and_then(CalKind::from_component_kind).is_none() {
            return Err(ComponentError::UnsupportedKind(child.name.clone()).into());
        }
        let container = calendar
            .take_component(index)
            .ok_or(ServiceError::InvariantViolation("calendar child vanished"))?;
        self.adopt(container)?;
        Ok(())
    }

    /// Appends the container to `calendar`, leaving this component empty.
    ///
    /// ## Errors
    ///
    /// Same as [`Self::to_container`].
    pub fn return_to(&mut self, calendar: &mut ICalendar) -> ServiceResult<()> {
        let container = self.take_container()?;
        calendar.add_component(container);
        Ok(())
    }

    /// Deep copy sharing the uid generator.
    ///
    /// ## Errors
    ///
    /// Returns `SequencePending` if a SEQUENCE increment has not been committed.
    pub fn try_clone(&self) -> ComponentResult<Self> {
        if self.needs_sequence_increment {
            return Err(ComponentError::SequencePending);
        }
        Ok(Self {
            container: self.container.clone(),
            kind: self.kind,
            index: self.index.clone(),
            alarms: self.alarms.clone(),
            alarm_index: self.alarm_index.clone(),
            needs_sequence_increment: false,
            uid_generator: self.uid_generator.clone(),
            untitled_description: self.untitled_description.clone(),
            max_iterations: self.max_iterations,
        })
    }

    // ----- sequence -----

    /// Applies a pending SEQUENCE increment and backfills alarm properties.
    ///
    /// An absent SEQUENCE becomes 1. DISPLAY and EMAIL alarms without a
    /// DESCRIPTION get the summary, or the configured placeholder; EMAIL
    /// alarms also get a SUMMARY.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn commit_sequence(&mut self) -> ComponentResult<()> {
        if self.container.is_none() {
            return Err(ComponentError::NotInitialized);
        }

        let summary = self.get_summary().map(|s| s.value);
        for alarm in &mut self.alarms {
            alarm.fill_required(summary.as_deref(), &self.untitled_description);
        }

        if !self.needs_sequence_increment {
            return Ok(());
        }
        let next = self.get_sequence().map_or(1, |s| s.saturating_add(1));
        self.set_sequence(Some(next))?;
        self.needs_sequence_increment = false;
        tracing::debug!(uid = ?self.get_uid(), sequence = next, "Sequence committed");
        Ok(())
    }

    /// Drops a pending SEQUENCE increment.
    pub fn abort_sequence(&mut self) {
        self.needs_sequence_increment = false;
    }

    fn mark_changed(&mut self) {
        self.needs_sequence_increment = true;
    }

    // ----- property plumbing -----

    fn prop(&self, slot: Option<usize>) -> Option<&Property> {
        self.container.as_ref()?.properties.get(slot?)
    }

    fn props<'a>(&'a self, slots: &'a [usize]) -> impl Iterator<Item = &'a Property> + 'a {
        let properties = self
            .container
            .as_ref()
            .map_or(&[][..], |c| c.properties.as_slice());
        slots.iter().filter_map(|&i| properties.get(i))
    }

    fn checked_container(&mut self) -> ComponentResult<&mut Component> {
        self.container.as_mut().ok_or(ComponentError::NotInitialized)
    }

    /// Replaces or removes the first property named `name`.
    fn write(&mut self, name: &str, prop: Option<Property>) -> ComponentResult<()> {
        let container = self.checked_container()?;
        match prop {
            Some(prop) => {
                container.set_property(prop);
            }
            None => {
                container.remove_properties(name);
            }
        }
        self.reindex();
        Ok(())
    }

    /// Replaces every property named `name`.
    fn write_all(&mut self, name: &str, props: Vec<Property>) -> ComponentResult<()> {
        let container = self.checked_container()?;
        container.remove_properties(name);
        container.properties.extend(props);
        self.reindex();
        Ok(())
    }

    fn remove(&mut self, name: &str) -> ComponentResult<()> {
        self.write(name, None)
    }

    fn text(&self, slot: Option<usize>) -> Option<&str> {
        self.prop(slot)?.value.as_str_like()
    }

    fn datetime(&self, slot: Option<usize>) -> Option<CalDateTime> {
        self.prop(slot).and_then(CalDateTime::from_property)
    }

    fn instant(&self, slot: Option<usize>) -> Option<DateTime<Utc>> {
        self.datetime(slot).map(|dt| dt.value.and_utc())
    }

    fn write_instant(&mut self, name: &str, value: Option<DateTime<Utc>>) -> ComponentResult<()> {
        let prop = value.map(|v| CalDateTime::utc(v.naive_utc()).to_property(name));
        self.write(name, prop)
    }

    fn texts(&self, slots: &[usize]) -> Vec<CalText> {
        self.props(slots).filter_map(CalText::from_property).collect()
    }

    fn write_texts(&mut self, name: &str, texts: &[CalText]) -> ComponentResult<()> {
        let props = texts.iter().map(|t| t.to_property(name)).collect();
        self.write_all(name, props)
    }

    fn rules(&self, slots: &[usize]) -> Vec<RRule> {
        self.props(slots)
            .filter_map(|p| p.as_recur().cloned())
            .collect()
    }

    fn bounded(property: &'static str, value: u8, max: u8) -> ComponentResult<()> {
        if value > max {
            return Err(ComponentError::OutOfRange {
                property,
                value: i64::from(value),
                min: 0,
                max: i64::from(max),
            });
        }
        Ok(())
    }

    // ----- identity and bookkeeping -----

    #[must_use]
    pub fn get_uid(&self) -> Option<&str> {
        self.text(self.index.uid)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_uid(&mut self, uid: &str) -> ComponentResult<()> {
        self.write(names::UID, Some(Property::text(names::UID, uid)))
    }

    #[must_use]
    pub fn get_dtstamp(&self) -> Option<CalDateTime> {
        self.datetime(self.index.dtstamp)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_dtstamp(&mut self, dtstamp: DateTime<Utc>) -> ComponentResult<()> {
        self.write_instant(names::DTSTAMP, Some(dtstamp))
    }

    #[must_use]
    pub fn get_sequence(&self) -> Option<u32> {
        self.prop(self.index.sequence)?
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_sequence(&mut self, sequence: Option<u32>) -> ComponentResult<()> {
        let prop = sequence.map(|s| {
            Property::integer(names::SEQUENCE, i32::try_from(s).unwrap_or(i32::MAX))
        });
        self.write(names::SEQUENCE, prop)
    }

    #[must_use]
    pub fn get_last_modified(&self) -> Option<DateTime<Utc>> {
        self.instant(self.index.last_modified)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_last_modified(&mut self, value: Option<DateTime<Utc>>) -> ComponentResult<()> {
        self.write_instant(names::LAST_MODIFIED, value)
    }

    #[must_use]
    pub fn get_created(&self) -> Option<DateTime<Utc>> {
        self.instant(self.index.created)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_created(&mut self, value: Option<DateTime<Utc>>) -> ComponentResult<()> {
        self.write_instant(names::CREATED, value)
    }

    #[must_use]
    pub fn get_completed(&self) -> Option<DateTime<Utc>> {
        self.instant(self.index.completed)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_completed(&mut self, value: Option<DateTime<Utc>>) -> ComponentResult<()> {
        self.write_instant(names::COMPLETED, value)
    }

    #[must_use]
    pub fn get_recurrence_id(&self) -> Option<CalDateTime> {
        self.datetime(self.index.recurrence_id)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_recurrence_id(&mut self, value: Option<&CalDateTime>) -> ComponentResult<()> {
        let prop = value.map(|v| v.to_property(names::RECURRENCE_ID));
        self.write(names::RECURRENCE_ID, prop)
    }

    // ----- dates and times -----

    #[must_use]
    pub fn get_dtstart(&self) -> Option<CalDateTime> {
        self.datetime(self.index.dtstart)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_dtstart(&mut self, value: Option<&CalDateTime>) -> ComponentResult<()> {
        let prop = value.map(|v| v.to_property(names::DTSTART));
        self.write(names::DTSTART, prop)?;
        self.mark_changed();
        Ok(())
    }

    /// DTSTART plus DURATION, when both exist.
    fn end_from_duration(&self) -> Option<CalDateTime> {
        let start = self.get_dtstart()?;
        let duration = self.get_duration()?;
        Some(start.with_value(add_duration(start.value, &duration)))
    }

    /// DTEND, derived from DTSTART and DURATION for events without one.
    #[must_use]
    pub fn get_dtend(&self) -> Option<CalDateTime> {
        match self.prop(self.index.dtend) {
            Some(prop) => CalDateTime::from_property(prop),
            None if self.kind == CalKind::Event => self.end_from_duration(),
            None => None,
        }
    }

    /// Sets DTEND; a new value replaces any DURATION.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_dtend(&mut self, value: Option<&CalDateTime>) -> ComponentResult<()> {
        if let Some(value) = value {
            self.remove(names::DURATION)?;
            self.write(names::DTEND, Some(value.to_property(names::DTEND)))?;
        } else {
            self.remove(names::DTEND)?;
        }
        self.mark_changed();
        Ok(())
    }

    /// DUE, derived from DTSTART and DURATION for to-dos without one.
    #[must_use]
    pub fn get_due(&self) -> Option<CalDateTime> {
        match self.prop(self.index.due) {
            Some(prop) => CalDateTime::from_property(prop),
            None if self.kind == CalKind::Todo => self.end_from_duration(),
            None => None,
        }
    }

    /// Sets DUE; a new value replaces any DURATION.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_due(&mut self, value: Option<&CalDateTime>) -> ComponentResult<()> {
        if let Some(value) = value {
            self.remove(names::DURATION)?;
            self.write(names::DUE, Some(value.to_property(names::DUE)))?;
        } else {
            self.remove(names::DUE)?;
        }
        self.mark_changed();
        Ok(())
    }

    #[must_use]
    pub fn get_duration(&self) -> Option<Duration> {
        self.prop(self.index.duration)?.as_duration().copied()
    }

    /// Sets DURATION; a new value replaces DTEND on events and DUE on to-dos.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_duration(&mut self, value: Option<Duration>) -> ComponentResult<()> {
        if let Some(duration) = value {
            match self.kind {
                CalKind::Event => self.remove(names::DTEND)?,
                CalKind::Todo => self.remove(names::DUE)?,
                _ => {}
            }
            self.write(
                names::DURATION,
                Some(Property::duration(names::DURATION, duration)),
            )?;
        } else {
            self.remove(names::DURATION)?;
        }
        self.mark_changed();
        Ok(())
    }

    /// Whether both components start and end at the same wall-clock time in
    /// the same zone. Absence matches absence.
    #[must_use]
    pub fn event_dates_match(&self, other: &Self) -> bool {
        self.get_dtstart() == other.get_dtstart() && self.get_dtend() == other.get_dtend()
    }

    // ----- classification and status -----

    #[must_use]
    pub fn get_classification(&self) -> Classification {
        self.text(self.index.classification)
            .map_or(Classification::None, Classification::parse)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_classification(&mut self, value: &Classification) -> ComponentResult<()> {
        let prop = value.as_str().map(|v| Property::text(names::CLASS, v));
        self.write(names::CLASS, prop)
    }

    #[must_use]
    pub fn get_status(&self) -> Status {
        self.text(self.index.status)
            .map_or(Status::None, Status::parse)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_status(&mut self, value: Status) -> ComponentResult<()> {
        let prop = value.as_str().map(|v| Property::text(names::STATUS, v));
        self.write(names::STATUS, prop)?;
        self.mark_changed();
        Ok(())
    }

    #[must_use]
    pub fn get_transparency(&self) -> Transparency {
        self.text(self.index.transparency)
            .map_or(Transparency::None, Transparency::parse)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_transparency(&mut self, value: Transparency) -> ComponentResult<()> {
        let prop = value.as_str().map(|v| Property::text(names::TRANSP, v));
        self.write(names::TRANSP, prop)
    }

    #[must_use]
    pub fn get_percent_complete(&self) -> Option<u8> {
        self.prop(self.index.percent_complete)?
            .as_integer()
            .and_then(|n| u8::try_from(n).ok())
    }

    /// ## Errors
    ///
    /// Returns `OutOfRange` above 100 and `NotInitialized` if there is no
    /// container.
    pub fn set_percent_complete(&mut self, value: Option<u8>) -> ComponentResult<()> {
        if let Some(percent) = value {
            Self::bounded(names::PERCENT_COMPLETE, percent, 100)?;
        }
        let prop = value.map(|p| Property::integer(names::PERCENT_COMPLETE, i32::from(p)));
        self.write(names::PERCENT_COMPLETE, prop)
    }

    #[must_use]
    pub fn get_priority(&self) -> Option<u8> {
        self.prop(self.index.priority)?
            .as_integer()
            .and_then(|n| u8::try_from(n).ok())
    }

    /// ## Errors
    ///
    /// Returns `OutOfRange` above 9 and `NotInitialized` if there is no
    /// container.
    pub fn set_priority(&mut self, value: Option<u8>) -> ComponentResult<()> {
        if let Some(priority) = value {
            Self::bounded(names::PRIORITY, priority, 9)?;
        }
        let prop = value.map(|p| Property::integer(names::PRIORITY, i32::from(p)));
        self.write(names::PRIORITY, prop)
    }

    // ----- descriptive -----

    #[must_use]
    pub fn get_summary(&self) -> Option<CalText> {
        self.prop(self.index.summary).and_then(CalText::from_property)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_summary(&mut self, value: Option<&CalText>) -> ComponentResult<()> {
        let prop = value.map(|v| v.to_property(names::SUMMARY));
        self.write(names::SUMMARY, prop)
    }

    #[must_use]
    pub fn get_location(&self) -> Option<&str> {
        self.text(self.index.location)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_location(&mut self, value: Option<&str>) -> ComponentResult<()> {
        let prop = value.map(|v| Property::text(names::LOCATION, v));
        self.write(names::LOCATION, prop)
    }

    #[must_use]
    pub fn get_url(&self) -> Option<&str> {
        self.text(self.index.url)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_url(&mut self, value: Option<&str>) -> ComponentResult<()> {
        let prop = value.map(|v| Property::uri(names::URL, v));
        self.write(names::URL, prop)
    }

    #[must_use]
    pub fn get_geo(&self) -> Option<Geo> {
        match self.prop(self.index.geo)?.value {
            Value::Geo(geo) => Some(geo),
            _ => None,
        }
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_geo(&mut self, value: Option<Geo>) -> ComponentResult<()> {
        self.write(names::GEO, value.map(Property::geo))
    }

    /// Categories across every CATEGORIES property, in order.
    #[must_use]
    pub fn get_categories(&self) -> Vec<String> {
        let mut categories = Vec::new();
        for prop in self.props(&self.index.categories) {
            match &prop.value {
                Value::TextList(items) => categories.extend(items.iter().cloned()),
                other => {
                    if let Some(text) = other.as_str_like() {
                        categories.extend(
                            text.split(',')
                                .map(str::trim)
                                .filter(|c| !c.is_empty())
                                .map(str::to_string),
                        );
                    }
                }
            }
        }
        categories
    }

    /// Replaces all categories with one CATEGORIES property.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_categories(&mut self, categories: &[String]) -> ComponentResult<()> {
        let props = if categories.is_empty() {
            Vec::new()
        } else {
            vec![Property::new(
                names::CATEGORIES,
                Value::TextList(categories.to_vec()),
            )]
        };
        self.write_all(names::CATEGORIES, props)
    }

    /// Categories joined with commas; `None` when there are none.
    #[must_use]
    pub fn get_categories_string(&self) -> Option<String> {
        let categories = self.get_categories();
        (!categories.is_empty()).then(|| categories.join(","))
    }

    /// Sets categories from a comma-separated string.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_categories_string(&mut self, categories: &str) -> ComponentResult<()> {
        let list: Vec<String> = categories
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        self.set_categories(&list)
    }

    #[must_use]
    pub fn get_comments(&self) -> Vec<CalText> {
        self.texts(&self.index.comments)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_comments(&mut self, comments: &[CalText]) -> ComponentResult<()> {
        self.write_texts(names::COMMENT, comments)
    }

    #[must_use]
    pub fn get_descriptions(&self) -> Vec<CalText> {
        self.texts(&self.index.descriptions)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_descriptions(&mut self, descriptions: &[CalText]) -> ComponentResult<()> {
        self.write_texts(names::DESCRIPTION, descriptions)
    }

    #[must_use]
    pub fn get_contacts(&self) -> Vec<CalText> {
        self.texts(&self.index.contacts)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_contacts(&mut self, contacts: &[CalText]) -> ComponentResult<()> {
        self.write_texts(names::CONTACT, contacts)
    }

    // ----- people -----

    #[must_use]
    pub fn get_organizer(&self) -> Option<Organizer> {
        self.prop(self.index.organizer)
            .and_then(Organizer::from_property)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_organizer(&mut self, value: Option<&Organizer>) -> ComponentResult<()> {
        self.write(names::ORGANIZER, value.map(Organizer::to_property))
    }

    #[must_use]
    pub fn get_attendees(&self) -> Vec<Attendee> {
        self.props(&self.index.attendees)
            .filter_map(Attendee::from_property)
            .collect()
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_attendees(&mut self, attendees: &[Attendee]) -> ComponentResult<()> {
        let props = attendees.iter().map(Attendee::to_property).collect();
        self.write_all(names::ATTENDEE, props)
    }

    // ----- recurrence -----

    #[must_use]
    pub fn get_rrules(&self) -> Vec<RRule> {
        self.rules(&self.index.rrules)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_rrules(&mut self, rules: &[RRule]) -> ComponentResult<()> {
        let props = rules
            .iter()
            .map(|r| Property::recur(names::RRULE, r.clone()))
            .collect();
        self.write_all(names::RRULE, props)?;
        self.mark_changed();
        Ok(())
    }

    #[must_use]
    pub fn get_exrules(&self) -> Vec<RRule> {
        self.rules(&self.index.exrules)
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_exrules(&mut self, rules: &[RRule]) -> ComponentResult<()> {
        let props = rules
            .iter()
            .map(|r| Property::recur(names::EXRULE, r.clone()))
            .collect();
        self.write_all(names::EXRULE, props)?;
        self.mark_changed();
        Ok(())
    }

    #[must_use]
    pub fn get_exdates(&self) -> Vec<CalDateTime> {
        self.props(&self.index.exdates)
            .filter_map(CalDateTime::from_property)
            .collect()
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_exdates(&mut self, dates: &[CalDateTime]) -> ComponentResult<()> {
        let props = dates.iter().map(|d| d.to_property(names::EXDATE)).collect();
        self.write_all(names::EXDATE, props)?;
        self.mark_changed();
        Ok(())
    }

    #[must_use]
    pub fn get_rdates(&self) -> Vec<CalPeriod> {
        self.props(&self.index.rdates)
            .filter_map(CalPeriod::from_property)
            .collect()
    }

    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn set_rdates(&mut self, periods: &[CalPeriod]) -> ComponentResult<()> {
        let props = periods.iter().map(CalPeriod::to_property).collect();
        self.write_all(names::RDATE, props)?;
        self.mark_changed();
        Ok(())
    }

    #[must_use]
    pub fn has_rrules(&self) -> bool {
        !self.index.rrules.is_empty()
    }

    #[must_use]
    pub fn has_rdates(&self) -> bool {
        !self.index.rdates.is_empty()
    }

    #[must_use]
    pub fn has_exdates(&self) -> bool {
        !self.index.exdates.is_empty()
    }

    #[must_use]
    pub fn has_exrules(&self) -> bool {
        !self.index.exrules.is_empty()
    }

    /// Whether the component recurs through rules or extra dates.
    #[must_use]
    pub fn has_recurrences(&self) -> bool {
        self.has_rrules() || self.has_rdates()
    }

    #[must_use]
    pub fn has_exceptions(&self) -> bool {
        self.has_exdates() || self.has_exrules()
    }

    /// Whether this is a detached instance of a recurring series.
    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.index.recurrence_id.is_some()
    }

    /// See [`simple::has_simple_recurrence`].
    #[must_use]
    pub fn has_simple_recurrence(&self) -> bool {
        simple::has_simple_recurrence(
            &self.get_rrules(),
            self.index.exrules.len(),
            self.index.exdates.len(),
            self.index.rdates.len(),
        )
    }

    /// Recurrence data for expansion; `None` without DTSTART.
    #[must_use]
    pub fn recurrence_set(&self) -> Option<RecurrenceSet> {
        RecurrenceSet::from_component(self)
    }

    /// Feeds each occurrence in `window` to `f` until it breaks.
    ///
    /// Returns the number of occurrences delivered; `0` without DTSTART.
    pub fn generate_instances<F>(&self, window: Window, f: F) -> usize
    where
        F: FnMut(&Occurrence) -> ControlFlow<()>,
    {
        self.recurrence_set()
            .map_or(0, |set| set.generate_instances(window, f))
    }

    /// End of the day on which the last counted occurrence of the first
    /// RRULE ends; `None` unless that rule has a COUNT.
    ///
    /// Only that rule is expanded. RDATEs, other rules and exceptions do not
    /// shift the counted occurrence.
    #[must_use]
    pub fn end_date_from_count(&self) -> Option<NaiveDateTime> {
        let rule = self.get_rrules().into_iter().next()?;
        let count = rule.count.filter(|c| *c > 0)?;
        let set = self.recurrence_set()?;
        RecurrenceSet::new(set.dtstart(), set.span())
            .with_rrule(rule)
            .with_max_iterations(self.max_iterations)
            .end_date_from_count(count)
    }

    // ----- alarms -----

    fn fresh_alarm_uid(&self) -> String {
        loop {
            let uid = self.uid_generator.next_uid();
            if !self.alarm_index.contains_key(&uid) {
                return uid;
            }
        }
    }

    fn insert_alarm(&mut self, mut alarm: CalAlarm) -> String {
        let current = alarm.uid().map(str::to_string);
        let uid = match current {
            Some(uid) if !self.alarm_index.contains_key(&uid) => uid,
            Some(taken) => {
                let fresh = self.fresh_alarm_uid();
                tracing::debug!(taken = %taken, uid = %fresh, "Alarm uid in use, regenerated");
                alarm.set_uid(&fresh);
                fresh
            }
            None => {
                let fresh = self.fresh_alarm_uid();
                alarm.set_uid(&fresh);
                fresh
            }
        };
        self.alarm_index.insert(uid.clone(), self.alarms.len());
        self.alarms.push(alarm);
        uid
    }

    fn rebuild_alarm_index(&mut self) {
        self.alarm_index = self
            .alarms
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.uid().map(|uid| (uid.to_string(), i)))
            .collect();
    }

    /// Attaches an alarm and returns its uid.
    ///
    /// An alarm without a uid, or with one already in use here, gets a fresh uid.
    ///
    /// ## Errors
    ///
    /// Returns `NotInitialized` if there is no container.
    pub fn add_alarm(&mut self, alarm: CalAlarm) -> ComponentResult<String> {
        if self.container.is_none() {
            return Err(ComponentError::NotInitialized);
        }
        Ok(self.insert_alarm(alarm))
    }

    /// Detaches an alarm and hands it back.
    pub fn remove_alarm(&mut self, uid: &str) -> Option<CalAlarm> {
        let position = self.alarm_index.remove(uid)?;
        let alarm = self.alarms.remove(position);
        self.rebuild_alarm_index();
        Some(alarm)
    }

    /// Detaches every alarm.
    pub fn remove_all_alarms(&mut self) -> Vec<CalAlarm> {
        self.alarm_index.clear();
        std::mem::take(&mut self.alarms)
    }

    #[must_use]
    pub fn get_alarm(&self, uid: &str) -> Option<&CalAlarm> {
        self.alarms.get(*self.alarm_index.get(uid)?)
    }

    pub fn get_alarm_mut(&mut self, uid: &str) -> Option<&mut CalAlarm> {
        let position = *self.alarm_index.get(uid)?;
        self.alarms.get_mut(position)
    }

    /// Alarm uids in attachment order.
    #[must_use]
    pub fn alarm_uids(&self) -> Vec<&str> {
        self.alarms.iter().filter_map(CalAlarm::uid).collect()
    }

    #[must_use]
    pub fn has_alarms(&self) -> bool {
        !self.alarms.is_empty()
    }
}

#[cfg(test)]
mod tests;
