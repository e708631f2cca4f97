use anyhow::Result;
use chrono::Utc;
use moafinder_core::date_range::DateRange;
use moafinder_core::event::Event;
use moafinder_core::ics::{event_to_ics, occurrences_to_ics};

pub fn run(events: &[Event], range: DateRange) -> Result<()> {
    let dtstamp = Utc::now();

    for event in events {
        let schedule = event.schedule(range.from, range.to)?;
        print!("{}", occurrences_to_ics(event, schedule, dtstamp)?);
    }

    Ok(())
}

pub fn run_rrule(events: &[Event]) -> Result<()> {
    let dtstamp = Utc::now();

    for event in events {
        print!("{}", event_to_ics(event, dtstamp)?);
    }

    Ok(())
}
