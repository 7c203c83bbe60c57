//! iCalendar property container and calendar arithmetic.
//!
//! - `core`: the generic property container handed over by an external
//!   iCalendar parser, and the typed values it carries
//! - `time`: pure wall-clock calendar arithmetic and ISO 8601 helpers
//!
//! ## Example
//!
//! ```rust
//! use tessen_rfc::rfc::ical::core::{Component, ICalendar, Property};
//!
//! let mut ical = ICalendar::default();
//! let mut event = Component::event();
//! event.add_property(Property::text("UID", "my-event-1"));
//! event.add_property(Property::text("SUMMARY", "Team Meeting"));
//! ical.add_event(event);
//!
//! assert_eq!(ical.uids(), vec!["my-event-1"]);
//! ```

pub mod core;
pub mod time;

pub use core::{Component, ComponentKind, ICalendar, Parameter, Property, Value};
