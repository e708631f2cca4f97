//! Core types for moafinder.
//!
//! This crate holds everything the event directory needs to reason about
//! schedules:
//! - `recurrence` for descriptors and their expansion into dates
//! - `event` for the directory event, its expiry and schedule queries
//! - `label` and `ics` for presenting a schedule

pub mod constants;
pub mod date;
pub mod date_range;
pub mod document;
pub mod error;
pub mod event;
pub mod ics;
pub mod label;
pub mod moafinder_config;
pub mod recurrence;

pub use error::{MoaError, MoaResult};
pub use event::{Event, Occurrence, TimeRange};
pub use recurrence::{resolve_occurrences, Occurrences, Recurrence, RecurrenceDescriptor};
