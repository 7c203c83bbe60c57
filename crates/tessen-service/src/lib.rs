//! Typed calendar components and recurrence expansion on top of the
//! generic iCalendar property container.

pub mod calendar;
pub mod error;
