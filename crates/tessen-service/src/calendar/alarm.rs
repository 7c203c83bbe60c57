//! VALARM sub-records.

use tessen_core::constants::ALARM_UID_PROPERTY;
use tessen_rfc::rfc::ical::core::{Component, ComponentKind, Property, names};

use super::types::{AlarmAction, AlarmRepeat, AlarmTrigger, Attendee};
use super::{ComponentError, ComponentResult};

/// A typed view over one VALARM.
///
/// Alarms are identified by the `X-TESSEN-ALARM-UID` property, which the
/// owning [`CalComponent`](super::CalComponent) assigns when the alarm is
/// attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CalAlarm {
    container: Component,
}

impl Default for CalAlarm {
    fn default() -> Self {
        Self::new()
    }
}

impl CalAlarm {
    /// Creates an empty alarm with no uid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            container: Component::alarm(),
        }
    }

    /// Wraps an existing VALARM container.
    ///
    /// ## Errors
    ///
    /// Returns `UnsupportedKind` if `container` is not a VALARM.
    pub fn from_container(container: Component) -> ComponentResult<Self> {
        if container.kind != Some(ComponentKind::Alarm) {
            return Err(ComponentError::UnsupportedKind(container.name));
        }
        Ok(Self { container })
    }

    #[must_use]
    pub fn container(&self) -> &Component {
        &self.container
    }

    #[must_use]
    pub fn into_container(self) -> Component {
        self.container
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.container
            .get_property(name)
            .and_then(|p| p.value.as_str_like())
    }

    fn put(&mut self, name: &str, prop: Option<Property>) {
        match prop {
            Some(prop) => {
                self.container.set_property(prop);
            }
            None => {
                self.container.remove_properties(name);
            }
        }
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.text(ALARM_UID_PROPERTY)
    }

    pub(crate) fn set_uid(&mut self, uid: &str) {
        self.put(
            ALARM_UID_PROPERTY,
            Some(Property::text(ALARM_UID_PROPERTY, uid)),
        );
    }

    #[must_use]
    pub fn get_action(&self) -> AlarmAction {
        self.text(names::ACTION)
            .map_or(AlarmAction::None, AlarmAction::parse)
    }

    pub fn set_action(&mut self, action: &AlarmAction) {
        let prop = action.as_str().map(|a| Property::text(names::ACTION, a));
        self.put(names::ACTION, prop);
    }

    /// Attachment URIs in order.
    #[must_use]
    pub fn get_attachments(&self) -> Vec<String> {
        self.container
            .get_properties(names::ATTACH)
            .into_iter()
            .filter_map(|p| p.value.as_str_like().map(str::to_string))
            .collect()
    }

    pub fn set_attachments(&mut self, uris: &[String]) {
        self.container.remove_properties(names::ATTACH);
        for uri in uris {
            self.container
                .add_property(Property::uri(names::ATTACH, uri.clone()));
        }
    }

    #[must_use]
    pub fn get_description(&self) -> Option<&str> {
        self.text(names::DESCRIPTION)
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        let prop = description.map(|d| Property::text(names::DESCRIPTION, d));
        self.put(names::DESCRIPTION, prop);
    }

    #[must_use]
    pub fn get_summary(&self) -> Option<&str> {
        self.text(names::SUMMARY)
    }

    pub fn set_summary(&mut self, summary: Option<&str>) {
        let prop = summary.map(|s| Property::text(names::SUMMARY, s));
        self.put(names::SUMMARY, prop);
    }

    /// The REPEAT/DURATION pair; `None` unless both are present and valid.
    #[must_use]
    pub fn get_repeat(&self) -> Option<AlarmRepeat> {
        let repetitions = self
            .container
            .get_property(names::REPEAT)?
            .as_integer()
            .and_then(|n| u32::try_from(n).ok())?;
        let duration = *self.container.get_property(names::DURATION)?.as_duration()?;
        Some(AlarmRepeat {
            repetitions,
            duration,
        })
    }

    pub fn set_repeat(&mut self, repeat: Option<AlarmRepeat>) {
        match repeat {
            Some(AlarmRepeat {
                repetitions,
                duration,
            }) => {
                let count = i32::try_from(repetitions).unwrap_or(i32::MAX);
                self.put(names::REPEAT, Some(Property::integer(names::REPEAT, count)));
                self.put(
                    names::DURATION,
                    Some(Property::duration(names::DURATION, duration)),
                );
            }
            None => {
                self.put(names::REPEAT, None);
                self.put(names::DURATION, None);
            }
        }
    }

    #[must_use]
    pub fn get_trigger(&self) -> AlarmTrigger {
        self.container
            .get_property(names::TRIGGER)
            .map_or(AlarmTrigger::None, AlarmTrigger::from_property)
    }

    pub fn set_trigger(&mut self, trigger: &AlarmTrigger) {
        self.put(names::TRIGGER, trigger.to_property());
    }

    /// Email recipients.
    #[must_use]
    pub fn get_attendees(&self) -> Vec<Attendee> {
        self.container
            .get_properties(names::ATTENDEE)
            .into_iter()
            .filter_map(Attendee::from_property)
            .collect()
    }

    pub fn set_attendees(&mut self, attendees: &[Attendee]) {
        self.container.remove_properties(names::ATTENDEE);
        for attendee in attendees {
            self.container.add_property(attendee.to_property());
        }
    }

    /// Adds the properties the alarm's action requires but lacks.
    ///
    /// DISPLAY and EMAIL alarms get a DESCRIPTION taken from `summary` or
    /// `placeholder`; EMAIL alarms also get a SUMMARY. Requirements that
    /// cannot be synthesized (EMAIL recipients, the PROCEDURE attachment) are
    /// only reported.
    pub(crate) fn fill_required(&mut self, summary: Option<&str>, placeholder: &str) {
        let action = self.get_action();
        let text = summary.filter(|s| !s.is_empty()).unwrap_or(placeholder);

        if matches!(action, AlarmAction::Display | AlarmAction::Email)
            && self.get_description().is_none()
        {
            self.set_description(Some(text));
        }

        match action {
            AlarmAction::Email => {
                if self.get_summary().is_none() {
                    self.set_summary(Some(text));
                }
                if self.container.get_property(names::ATTENDEE).is_none() {
                    tracing::warn!(uid = ?self.uid(), "EMAIL alarm has no attendees");
                }
            }
            AlarmAction::Procedure if self.container.get_property(names::ATTACH).is_none() => {
                tracing::warn!(uid = ?self.uid(), "PROCEDURE alarm has no attachment");
            }
            _ => {}
        }
    }
}
