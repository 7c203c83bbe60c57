//! iCalendar parameter types (RFC 5545 §3.2).

use std::fmt;

/// A single iCalendar property parameter.
///
/// For `DTSTART;TZID=America/New_York:20260123T120000` the parameter has
/// name `TZID` and value `America/New_York`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values. Most parameters have one value, but some
    /// (like MEMBER) can have multiple comma-separated values.
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a new parameter with multiple values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first (and usually only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Creates a TZID parameter.
    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new(names::TZID, tzid)
    }

    /// Creates a VALUE parameter.
    #[must_use]
    pub fn value_type(value_type: impl Into<String>) -> Self {
        Self::new(names::VALUE, value_type)
    }

    /// Creates a RELATED parameter (for triggers).
    #[must_use]
    pub fn related(related: TriggerRelated) -> Self {
        Self::new(names::RELATED, related.as_str())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.values.is_empty() {
            return Ok(());
        }
        write!(f, "=")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if value.chars().any(|c| matches!(c, ':' | ';' | ',' | '"')) {
                write!(f, "\"{value}\"")?;
            } else {
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}

/// RELATED parameter values for TRIGGER (RFC 5545 §3.2.14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerRelated {
    /// Relative to component start (default).
    #[default]
    Start,
    /// Relative to component end.
    End,
}

impl TriggerRelated {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::End => "END",
        }
    }

    /// Parses a RELATED value; anything but `END` means start.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("END") {
            Self::End
        } else {
            Self::Start
        }
    }
}

impl fmt::Display for TriggerRelated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameter names the calendar core reads or writes.
pub mod names {
    /// Alternate text representation.
    pub const ALTREP: &str = "ALTREP";
    /// Common name.
    pub const CN: &str = "CN";
    /// Calendar user type.
    pub const CUTYPE: &str = "CUTYPE";
    /// Delegators.
    pub const DELEGATED_FROM: &str = "DELEGATED-FROM";
    /// Delegatees.
    pub const DELEGATED_TO: &str = "DELEGATED-TO";
    /// Language.
    pub const LANGUAGE: &str = "LANGUAGE";
    /// Group or list membership.
    pub const MEMBER: &str = "MEMBER";
    /// Participation status.
    pub const PARTSTAT: &str = "PARTSTAT";
    /// Alarm trigger relationship.
    pub const RELATED: &str = "RELATED";
    /// Participation role.
    pub const ROLE: &str = "ROLE";
    /// RSVP expectation.
    pub const RSVP: &str = "RSVP";
    /// Sent by.
    pub const SENT_BY: &str = "SENT-BY";
    /// Time zone identifier.
    pub const TZID: &str = "TZID";
    /// Value data type.
    pub const VALUE: &str = "VALUE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_display_quoted() {
        let param = Parameter::new("CN", "Doe; Jane");
        assert_eq!(param.to_string(), "CN=\"Doe; Jane\"");
    }

    #[test]
    fn parameter_name_normalized() {
        let param = Parameter::new("tzid", "Europe/London");
        assert_eq!(param.name, "TZID");
        assert_eq!(param.value(), Some("Europe/London"));
    }

    #[test]
    fn trigger_related_parse() {
        assert_eq!(TriggerRelated::parse("end"), TriggerRelated::End);
        assert_eq!(TriggerRelated::parse("START"), TriggerRelated::Start);
        assert_eq!(TriggerRelated::parse("bogus"), TriggerRelated::Start);
    }
}
