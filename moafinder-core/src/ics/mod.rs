//! ICS export of event schedules.
//!
//! - `occurrences_to_ics`: one VEVENT per resolved occurrence
//! - `event_to_ics`: one VEVENT with the event's RRULE

mod generate;

pub use generate::{event_to_ics, occurrences_to_ics};
