use anyhow::Result;
use moafinder_core::event::Event;
use moafinder_core::label::{describe, Language};

pub fn run(events: &[Event], lang: Language) -> Result<()> {
    for event in events {
        println!(
            "{}: {}",
            event.title,
            describe(&event.recurrence, event.start_date, lang)
        );
    }
    Ok(())
}
