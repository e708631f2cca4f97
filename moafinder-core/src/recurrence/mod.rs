//! Recurring event schedules.
//!
//! - `descriptor`: the typed recurrence pattern attached to an event
//! - `raw`: the flat field layout the events collection stores
//! - `resolver`: expansion of a pattern into concrete dates

mod descriptor;
mod raw;
mod resolver;

pub use descriptor::{
    DayOfMonth, MonthlyRule, Recurrence, RecurrenceDescriptor, WeekIndex, WeekdaySet,
};
pub use raw::{DayToken, EventType, MonthlyMode, RawRecurrence};
pub use resolver::{resolve_occurrences, Occurrences};
