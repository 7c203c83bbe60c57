//! Typed calendar components.
//!
//! - `component`: [`CalComponent`], the cached typed view over one VEVENT,
//!   VTODO, VJOURNAL, VFREEBUSY or VTIMEZONE container
//! - `alarm`: [`CalAlarm`], a VALARM owned by its component
//! - `recurrence`: occurrence expansion
//! - `simple`: classification of rules an editor can show with basic controls
//! - `types`: typed property values
//! - `uid`: uid synthesis

pub mod alarm;
pub mod component;
pub mod recurrence;
pub mod simple;
pub mod types;
pub mod uid;

use thiserror::Error;

pub use alarm::CalAlarm;
pub use component::{CalComponent, CalKind};
pub use recurrence::{Occurrence, Occurrences, RecurrenceSet, Window};
pub use uid::{HostIdentity, UidGenerator};

/// Errors raised by typed component operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("Component has no backing container")]
    NotInitialized,

    #[error("Unsupported component kind: {0}")]
    UnsupportedKind(String),

    #[error("{property} value {value} outside {min}..={max}")]
    OutOfRange {
        property: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Sequence increment pending; commit or abort it first")]
    SequencePending,
}

pub type ComponentResult<T> = std::result::Result<T, ComponentError>;
