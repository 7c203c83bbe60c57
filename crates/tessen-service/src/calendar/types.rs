//! Typed values read from and written to component properties.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tessen_rfc::rfc::ical::core::{
    Date, DateTime, DateTimeForm, Duration, Parameter, Period, Property, TriggerRelated, Value,
    names, param_names,
};
use tessen_rfc::rfc::ical::time::parse_iso8601;

const UTC_TZID: &str = "UTC";

/// A date or date-time with an optional timezone identifier.
///
/// `tzid == Some("UTC")` is the UTC form; it is written without a TZID
/// parameter and read back the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalDateTime {
    /// Wall-clock value; midnight when `is_date`.
    pub value: NaiveDateTime,
    pub is_date: bool,
    pub tzid: Option<String>,
}

impl CalDateTime {
    #[must_use]
    pub fn floating(value: NaiveDateTime) -> Self {
        Self {
            value,
            is_date: false,
            tzid: None,
        }
    }

    #[must_use]
    pub fn utc(value: NaiveDateTime) -> Self {
        Self {
            value,
            is_date: false,
            tzid: Some(UTC_TZID.to_string()),
        }
    }

    /// A zoned value; any spelling of `UTC` becomes the UTC form.
    #[must_use]
    pub fn zoned(value: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self {
            value,
            is_date: false,
            tzid: Some(canonical_tzid(tzid.into())),
        }
    }

    #[must_use]
    pub fn date(date: NaiveDate) -> Self {
        Self {
            value: date.and_time(NaiveTime::MIN),
            is_date: true,
            tzid: None,
        }
    }

    #[must_use]
    pub fn is_utc(&self) -> bool {
        self.tzid
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(UTC_TZID))
    }

    /// Returns a copy with the wall-clock value replaced.
    #[must_use]
    pub fn with_value(&self, value: NaiveDateTime) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    /// Reads a DATE or DATE-TIME property.
    ///
    /// Text values are parsed as ISO 8601, which covers parsers that leave
    /// date values untyped.
    #[must_use]
    pub fn from_property(prop: &Property) -> Option<Self> {
        let param_tzid = prop.get_param_value(param_names::TZID);
        match &prop.value {
            Value::DateTime(dt) => from_rfc_datetime(dt, param_tzid),
            Value::Date(d) => Some(Self {
                tzid: param_tzid.map(|t| canonical_tzid(t.to_string())),
                ..Self::date(d.to_naive()?)
            }),
            Value::Text(s) | Value::Unknown(s) => {
                let parsed = parse_iso8601(s).ok()?;
                let tzid = if parsed.is_utc {
                    Some(UTC_TZID.to_string())
                } else {
                    param_tzid.map(|t| canonical_tzid(t.to_string()))
                };
                Some(Self {
                    value: parsed.value,
                    is_date: parsed.is_date,
                    tzid,
                })
            }
            _ => None,
        }
    }

    /// Builds a property carrying this value.
    #[must_use]
    pub fn to_property(&self, name: &str) -> Property {
        if self.is_date {
            let mut prop = Property::date(name, Date::from_naive(self.value.date()));
            if let Some(tzid) = self.tzid.as_deref().filter(|_| !self.is_utc()) {
                prop.set_param(Parameter::tzid(tzid));
            }
            prop
        } else {
            Property::datetime(name, self.to_rfc_datetime())
        }
    }

    pub(crate) fn to_rfc_datetime(&self) -> DateTime {
        let form = match self.tzid.as_deref() {
            None => DateTimeForm::Floating,
            Some(_) if self.is_utc() => DateTimeForm::Utc,
            Some(tzid) => DateTimeForm::Zoned {
                tzid: tzid.to_string(),
            },
        };
        DateTime::from_naive(self.value, form)
    }
}

impl fmt::Display for CalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_date {
            write!(f, "{}", self.value.date())?;
        } else {
            write!(f, "{}", self.value)?;
        }
        if let Some(tzid) = &self.tzid {
            write!(f, " [{tzid}]")?;
        }
        Ok(())
    }
}

fn canonical_tzid(tzid: String) -> String {
    if tzid.eq_ignore_ascii_case(UTC_TZID) {
        UTC_TZID.to_string()
    } else {
        tzid
    }
}

fn from_rfc_datetime(dt: &DateTime, param_tzid: Option<&str>) -> Option<CalDateTime> {
    let value = dt.to_naive()?;
    let tzid = match &dt.form {
        DateTimeForm::Utc => Some(UTC_TZID.to_string()),
        DateTimeForm::Zoned { tzid } => Some(canonical_tzid(tzid.clone())),
        DateTimeForm::Floating => param_tzid.map(|t| canonical_tzid(t.to_string())),
    };
    Some(CalDateTime {
        value,
        is_date: false,
        tzid,
    })
}

/// How a recurrence-date period ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodEnd {
    DateTime(NaiveDateTime),
    Duration(Duration),
}

/// An RDATE value: a bare date or date-time, or a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalPeriod {
    pub start: CalDateTime,
    pub end: Option<PeriodEnd>,
}

impl CalPeriod {
    #[must_use]
    pub fn instant(start: CalDateTime) -> Self {
        Self { start, end: None }
    }

    #[must_use]
    pub fn with_end(start: CalDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: Some(PeriodEnd::DateTime(end)),
        }
    }

    #[must_use]
    pub fn with_duration(start: CalDateTime, duration: Duration) -> Self {
        Self {
            start,
            end: Some(PeriodEnd::Duration(duration)),
        }
    }

    /// Reads an RDATE property.
    ///
    /// Values of an unexpected type fall back to date-time parsing of the
    /// raw text; `start/end` text yields an explicit period.
    #[must_use]
    pub fn from_property(prop: &Property) -> Option<Self> {
        let param_tzid = prop.get_param_value(param_names::TZID);
        match &prop.value {
            Value::Period(Period::Explicit { start, end }) => Some(Self::with_end(
                from_rfc_datetime(start, param_tzid)?,
                end.to_naive()?,
            )),
            Value::Period(Period::Duration { start, duration }) => Some(Self::with_duration(
                from_rfc_datetime(start, param_tzid)?,
                *duration,
            )),
            Value::DateTime(_) | Value::Date(_) => {
                CalDateTime::from_property(prop).map(Self::instant)
            }
            _ => {
                tracing::debug!(
                    raw = %prop.raw_value,
                    "Unrecognized RDATE value, parsing as date-time"
                );
                let (start_text, end_text) = match prop.raw_value.split_once('/') {
                    Some((s, e)) => (s, Some(e)),
                    None => (prop.raw_value.as_str(), None),
                };
                let start = parse_iso8601(start_text).ok()?;
                let start = CalDateTime {
                    value: start.value,
                    is_date: start.is_date,
                    tzid: if start.is_utc {
                        Some(UTC_TZID.to_string())
                    } else {
                        param_tzid.map(str::to_string)
                    },
                };
                let end = end_text
                    .and_then(|e| parse_iso8601(e).ok())
                    .map(|e| PeriodEnd::DateTime(e.value));
                Some(Self { start, end })
            }
        }
    }

    /// Builds an RDATE property.
    #[must_use]
    pub fn to_property(&self) -> Property {
        let start = self.start.to_rfc_datetime();
        let tzid = start.tzid().map(str::to_string);
        let mut prop = match &self.end {
            None => return self.start.to_property(names::RDATE),
            Some(PeriodEnd::DateTime(end)) => Property::period(
                names::RDATE,
                Period::explicit(start.clone(), DateTime::from_naive(*end, start.form.clone())),
            ),
            Some(PeriodEnd::Duration(duration)) => {
                Property::period(names::RDATE, Period::from_duration(start, *duration))
            }
        };
        if let Some(tzid) = tzid {
            prop.set_param(Parameter::tzid(tzid));
        }
        prop
    }
}

/// Text with an optional alternate representation URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalText {
    pub value: String,
    pub altrep: Option<String>,
}

impl CalText {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            altrep: None,
        }
    }

    #[must_use]
    pub fn with_altrep(mut self, altrep: impl Into<String>) -> Self {
        self.altrep = Some(altrep.into());
        self
    }

    #[must_use]
    pub fn from_property(prop: &Property) -> Option<Self> {
        Some(Self {
            value: prop.value.as_str_like()?.to_string(),
            altrep: prop.get_param_value(param_names::ALTREP).map(str::to_string),
        })
    }

    #[must_use]
    pub fn to_property(&self, name: &str) -> Property {
        let mut prop = Property::text(name, self.value.clone());
        prop.set_optional_param(param_names::ALTREP, self.altrep.as_deref());
        prop
    }
}

impl From<&str> for CalText {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// CLASS property. `None` means the property is absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Classification {
    #[default]
    None,
    Public,
    Private,
    Confidential,
    Other(String),
}

impl Classification {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Public => Some("PUBLIC"),
            Self::Private => Some("PRIVATE"),
            Self::Confidential => Some("CONFIDENTIAL"),
            Self::Other(s) => Some(s),
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Self::Public,
            "PRIVATE" => Self::Private,
            "CONFIDENTIAL" => Self::Confidential,
            "" => Self::None,
            _ => Self::Other(s.to_string()),
        }
    }
}

/// STATUS property. `None` means the property is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    None,
    Tentative,
    Confirmed,
    Cancelled,
    NeedsAction,
    Completed,
    InProcess,
    Draft,
    Final,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        Some(match self {
            Self::None => return None,
            Self::Tentative => "TENTATIVE",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::NeedsAction => "NEEDS-ACTION",
            Self::Completed => "COMPLETED",
            Self::InProcess => "IN-PROCESS",
            Self::Draft => "DRAFT",
            Self::Final => "FINAL",
        })
    }

    /// Parses a STATUS value; unknown values read as `None`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "TENTATIVE" => Self::Tentative,
            "CONFIRMED" => Self::Confirmed,
            "CANCELLED" => Self::Cancelled,
            "NEEDS-ACTION" => Self::NeedsAction,
            "COMPLETED" => Self::Completed,
            "IN-PROCESS" => Self::InProcess,
            "DRAFT" => Self::Draft,
            "FINAL" => Self::Final,
            other => {
                tracing::debug!(status = other, "Unknown STATUS value");
                Self::None
            }
        }
    }
}

/// TRANSP property. `None` means the property is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transparency {
    #[default]
    None,
    Opaque,
    Transparent,
}

impl Transparency {
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Opaque => Some("OPAQUE"),
            Self::Transparent => Some("TRANSPARENT"),
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "OPAQUE" => Self::Opaque,
            "TRANSPARENT" => Self::Transparent,
            _ => Self::None,
        }
    }
}

/// Declares a parameter keyword enum with an `Other` fallback for x-names.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(s) => s,
                }
            }

            #[must_use]
            pub fn parse(s: &str) -> Self {
                $(if s.eq_ignore_ascii_case($text) {
                    return Self::$variant;
                })+
                Self::Other(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

keyword_enum! {
    /// ROLE parameter.
    Role {
        Chair => "CHAIR",
        ReqParticipant => "REQ-PARTICIPANT",
        OptParticipant => "OPT-PARTICIPANT",
        NonParticipant => "NON-PARTICIPANT",
    }
}

keyword_enum! {
    /// PARTSTAT parameter.
    PartStat {
        NeedsAction => "NEEDS-ACTION",
        Accepted => "ACCEPTED",
        Declined => "DECLINED",
        Tentative => "TENTATIVE",
        Delegated => "DELEGATED",
        Completed => "COMPLETED",
        InProcess => "IN-PROCESS",
    }
}

keyword_enum! {
    /// CUTYPE parameter.
    CuType {
        Individual => "INDIVIDUAL",
        Group => "GROUP",
        Resource => "RESOURCE",
        Room => "ROOM",
        Unknown => "UNKNOWN",
    }
}

fn param_list(prop: &Property, name: &str) -> Vec<String> {
    prop.get_param(name)
        .map(|p| p.values.clone())
        .unwrap_or_default()
}

fn set_param_list(prop: &mut Property, name: &str, values: &[String]) {
    if values.is_empty() {
        prop.remove_param(name);
    } else {
        prop.set_param(Parameter::with_values(name, values.to_vec()));
    }
}

fn param_string(prop: &Property, name: &str) -> Option<String> {
    prop.get_param_value(name).map(str::to_string)
}

/// An ATTENDEE property with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attendee {
    /// Calendar address, usually a `mailto:` URI.
    pub address: String,
    pub cn: Option<String>,
    pub role: Option<Role>,
    pub partstat: Option<PartStat>,
    pub rsvp: Option<bool>,
    pub cutype: Option<CuType>,
    pub member: Vec<String>,
    pub delegated_to: Vec<String>,
    pub delegated_from: Vec<String>,
    pub sent_by: Option<String>,
    pub language: Option<String>,
}

impl Attendee {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_property(prop: &Property) -> Option<Self> {
        Some(Self {
            address: prop.value.as_str_like()?.to_string(),
            cn: param_string(prop, param_names::CN),
            role: prop.get_param_value(param_names::ROLE).map(Role::parse),
            partstat: prop
                .get_param_value(param_names::PARTSTAT)
                .map(PartStat::parse),
            rsvp: prop
                .get_param_value(param_names::RSVP)
                .map(|v| v.eq_ignore_ascii_case("TRUE")),
            cutype: prop.get_param_value(param_names::CUTYPE).map(CuType::parse),
            member: param_list(prop, param_names::MEMBER),
            delegated_to: param_list(prop, param_names::DELEGATED_TO),
            delegated_from: param_list(prop, param_names::DELEGATED_FROM),
            sent_by: param_string(prop, param_names::SENT_BY),
            language: param_string(prop, param_names::LANGUAGE),
        })
    }

    #[must_use]
    pub fn to_property(&self) -> Property {
        let mut prop = Property::cal_address(names::ATTENDEE, self.address.clone());
        prop.set_optional_param(param_names::CN, self.cn.as_deref());
        prop.set_optional_param(param_names::ROLE, self.role.as_ref().map(Role::as_str));
        prop.set_optional_param(
            param_names::PARTSTAT,
            self.partstat.as_ref().map(PartStat::as_str),
        );
        prop.set_optional_param(
            param_names::RSVP,
            self.rsvp.map(|r| if r { "TRUE" } else { "FALSE" }),
        );
        prop.set_optional_param(
            param_names::CUTYPE,
            self.cutype.as_ref().map(CuType::as_str),
        );
        set_param_list(&mut prop, param_names::MEMBER, &self.member);
        set_param_list(&mut prop, param_names::DELEGATED_TO, &self.delegated_to);
        set_param_list(&mut prop, param_names::DELEGATED_FROM, &self.delegated_from);
        prop.set_optional_param(param_names::SENT_BY, self.sent_by.as_deref());
        prop.set_optional_param(param_names::LANGUAGE, self.language.as_deref());
        prop
    }
}

/// An ORGANIZER property with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Organizer {
    pub address: String,
    pub sent_by: Option<String>,
    pub cn: Option<String>,
    pub language: Option<String>,
}

impl Organizer {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_property(prop: &Property) -> Option<Self> {
        Some(Self {
            address: prop.value.as_str_like()?.to_string(),
            sent_by: param_string(prop, param_names::SENT_BY),
            cn: param_string(prop, param_names::CN),
            language: param_string(prop, param_names::LANGUAGE),
        })
    }

    #[must_use]
    pub fn to_property(&self) -> Property {
        let mut prop = Property::cal_address(names::ORGANIZER, self.address.clone());
        prop.set_optional_param(param_names::SENT_BY, self.sent_by.as_deref());
        prop.set_optional_param(param_names::CN, self.cn.as_deref());
        prop.set_optional_param(param_names::LANGUAGE, self.language.as_deref());
        prop
    }
}

/// ACTION property of an alarm. `None` means the property is absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlarmAction {
    #[default]
    None,
    Audio,
    Display,
    Email,
    Procedure,
    Unknown(String),
}

impl AlarmAction {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Audio => Some("AUDIO"),
            Self::Display => Some("DISPLAY"),
            Self::Email => Some("EMAIL"),
            Self::Procedure => Some("PROCEDURE"),
            Self::Unknown(s) => Some(s),
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "AUDIO" => Self::Audio,
            "DISPLAY" => Self::Display,
            "EMAIL" => Self::Email,
            "PROCEDURE" => Self::Procedure,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

/// TRIGGER property of an alarm.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlarmTrigger {
    #[default]
    None,
    /// Offset from the start or end of the owning component.
    Relative {
        related: TriggerRelated,
        duration: Duration,
    },
    /// Absolute UTC time.
    Absolute(NaiveDateTime),
}

impl AlarmTrigger {
    #[must_use]
    pub fn from_property(prop: &Property) -> Self {
        match &prop.value {
            Value::Duration(duration) => Self::Relative {
                related: prop
                    .get_param_value(param_names::RELATED)
                    .map(TriggerRelated::parse)
                    .unwrap_or_default(),
                duration: *duration,
            },
            _ => CalDateTime::from_property(prop).map_or(Self::None, |dt| Self::Absolute(dt.value)),
        }
    }

    #[must_use]
    pub fn to_property(&self) -> Option<Property> {
        match self {
            Self::None => None,
            Self::Relative { related, duration } => {
                let mut prop = Property::duration(names::TRIGGER, *duration);
                if *related == TriggerRelated::End {
                    prop.set_param(Parameter::related(*related));
                }
                Some(prop)
            }
            Self::Absolute(at) => {
                let mut prop = CalDateTime::utc(*at).to_property(names::TRIGGER);
                prop.set_param(Parameter::value_type("DATE-TIME"));
                Some(prop)
            }
        }
    }
}

/// REPEAT and DURATION of an alarm, which only exist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmRepeat {
    pub repetitions: u32,
    pub duration: Duration,
}
