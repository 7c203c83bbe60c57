//! iCalendar property type (RFC 5545 §3.8).

use super::{Date, DateTime, Duration, Geo, Parameter, Period, RRule, Value};

/// A fully parsed iCalendar property.
///
/// Contains the typed value along with the raw value text the external
/// parser saw, so unknown content survives a round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Typed value.
    pub value: Value,
    /// Raw value string (for round-trip).
    pub raw_value: String,
}

impl Property {
    /// Creates a property from a typed value; the raw text is derived from it.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let raw_value = value.to_string();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value,
            raw_value,
        }
    }

    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Value::Text(value.into()))
    }

    /// Creates a property with an integer value.
    #[must_use]
    pub fn integer(name: impl Into<String>, value: i32) -> Self {
        Self::new(name, Value::Integer(value))
    }

    /// Creates a property with a datetime value.
    ///
    /// Zoned values carry their TZID as a parameter, as the wire form does.
    #[must_use]
    pub fn datetime(name: impl Into<String>, dt: DateTime) -> Self {
        let tzid = dt.tzid().map(str::to_string);
        let mut prop = Self::new(name, Value::DateTime(dt));
        if let Some(tzid) = tzid {
            prop.params.push(Parameter::tzid(tzid));
        }
        prop
    }

    /// Creates a property with a date value.
    #[must_use]
    pub fn date(name: impl Into<String>, d: Date) -> Self {
        let mut prop = Self::new(name, Value::Date(d));
        prop.params.push(Parameter::value_type("DATE"));
        prop
    }

    /// Creates a property with a duration value.
    #[must_use]
    pub fn duration(name: impl Into<String>, d: Duration) -> Self {
        Self::new(name, Value::Duration(d))
    }

    /// Creates a property with a PERIOD value.
    #[must_use]
    pub fn period(name: impl Into<String>, period: Period) -> Self {
        let mut prop = Self::new(name, Value::Period(period));
        prop.params.push(Parameter::value_type("PERIOD"));
        prop
    }

    /// Creates a property with a RECUR value.
    #[must_use]
    pub fn recur(name: impl Into<String>, rule: RRule) -> Self {
        Self::new(name, Value::Recur(Box::new(rule)))
    }

    /// Creates a property with a CAL-ADDRESS value.
    #[must_use]
    pub fn cal_address(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self::new(name, Value::CalAddress(address.into()))
    }

    /// Creates a property with a URI value.
    #[must_use]
    pub fn uri(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::new(name, Value::Uri(uri.into()))
    }

    /// Creates a GEO property.
    #[must_use]
    pub fn geo(geo: Geo) -> Self {
        Self::new(names::GEO, Value::Geo(geo))
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        let p = self.get_param(name)?;
        p.value()
    }

    /// Sets a parameter, replacing any existing parameter with the same name.
    pub fn set_param(&mut self, param: Parameter) {
        self.params.retain(|p| p.name != param.name);
        self.params.push(param);
    }

    /// Removes a parameter by name.
    pub fn remove_param(&mut self, name: &str) {
        let name_upper = name.to_ascii_uppercase();
        self.params.retain(|p| p.name != name_upper);
    }

    /// Sets the parameter when `value` is `Some`, removes it otherwise.
    pub fn set_optional_param(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(v) => self.set_param(Parameter::new(name, v)),
            None => self.remove_param(name),
        }
    }

    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Returns the value as an integer if it is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        self.value.as_integer()
    }

    /// Returns the value as a datetime if it is a datetime value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        self.value.as_datetime()
    }

    /// Returns the value as a duration if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        self.value.as_duration()
    }

    /// Returns the value as a recurrence rule if it is a recur value.
    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        self.value.as_recur()
    }
}

/// Property names the calendar core reads or writes.
pub mod names {
    // Descriptive properties
    pub const ATTACH: &str = "ATTACH";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const CLASS: &str = "CLASS";
    pub const COMMENT: &str = "COMMENT";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const GEO: &str = "GEO";
    pub const LOCATION: &str = "LOCATION";
    pub const PERCENT_COMPLETE: &str = "PERCENT-COMPLETE";
    pub const PRIORITY: &str = "PRIORITY";
    pub const STATUS: &str = "STATUS";
    pub const SUMMARY: &str = "SUMMARY";

    // Date and time properties
    pub const COMPLETED: &str = "COMPLETED";
    pub const DTEND: &str = "DTEND";
    pub const DUE: &str = "DUE";
    pub const DTSTART: &str = "DTSTART";
    pub const DURATION: &str = "DURATION";
    pub const TRANSP: &str = "TRANSP";

    // Relationship properties
    pub const ATTENDEE: &str = "ATTENDEE";
    pub const CONTACT: &str = "CONTACT";
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const URL: &str = "URL";
    pub const UID: &str = "UID";

    // Recurrence properties
    pub const EXDATE: &str = "EXDATE";
    pub const EXRULE: &str = "EXRULE";
    pub const RDATE: &str = "RDATE";
    pub const RRULE: &str = "RRULE";

    // Alarm properties
    pub const ACTION: &str = "ACTION";
    pub const REPEAT: &str = "REPEAT";
    pub const TRIGGER: &str = "TRIGGER";

    // Change management properties
    pub const CREATED: &str = "CREATED";
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const SEQUENCE: &str = "SEQUENCE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_text() {
        let prop = Property::text("summary", "Meeting");
        assert_eq!(prop.name, "SUMMARY");
        assert_eq!(prop.as_text(), Some("Meeting"));
        assert_eq!(prop.raw_value, "Meeting");
    }

    #[test]
    fn property_integer() {
        let prop = Property::integer("SEQUENCE", 5);
        assert_eq!(prop.as_integer(), Some(5));
        assert_eq!(prop.raw_value, "5");
    }

    #[test]
    fn zoned_datetime_gets_tzid_param() {
        let dt = DateTime::zoned(2026, 1, 23, 12, 0, 0, "Europe/Berlin");
        let prop = Property::datetime("DTSTART", dt);
        assert_eq!(prop.get_param_value("TZID"), Some("Europe/Berlin"));
        assert_eq!(prop.raw_value, "20260123T120000");
    }

    #[test]
    fn optional_param_round_trip() {
        let mut prop = Property::text("SUMMARY", "Lunch");
        prop.set_optional_param("ALTREP", Some("http://example.com/lunch"));
        assert_eq!(
            prop.get_param_value("altrep"),
            Some("http://example.com/lunch")
        );
        prop.set_optional_param("ALTREP", None);
        assert!(prop.get_param("ALTREP").is_none());
    }
}
