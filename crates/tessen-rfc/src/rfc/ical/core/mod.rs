//! iCalendar property container (RFC 2445 / RFC 5545).
//!
//! These types are the hand-off format between an external text parser and
//! the typed component layer. They are designed for:
//! - Round-trip fidelity: unknown properties, parameters and raw values survive
//! - Index addressing: properties live in one ordered `Vec`, so callers can
//!   hold positions instead of references
//! - Type safety: value variants for every RFC value type the core reads

mod component;
mod datetime;
mod duration;
mod parameter;
mod property;
mod rrule;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{DateTime, DateTimeForm, Time, UtcOffset};
pub use duration::{Duration, DurationBuilder};
pub use parameter::{Parameter, TriggerRelated, names as param_names};
pub use property::{Property, names};
pub use rrule::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum};
pub use value::{Date, Geo, Period, Value};
