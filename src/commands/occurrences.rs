use anyhow::Result;
use chrono::NaiveDate;
use moafinder_core::date_range::DateRange;
use moafinder_core::event::{Event, Occurrence};
use moafinder_core::label::Language;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::render::{Render, RenderContext};

pub fn run(events: &[Event], range: DateRange, today: NaiveDate, lang: Language) -> Result<()> {
    let ctx = RenderContext { today, lang };

    for (i, event) in events.iter().enumerate() {
        println!("{}", event.render(ctx));

        let schedule: Vec<Occurrence> = event.schedule(range.from, range.to)?.collect();

        if schedule.is_empty() {
            let none = match lang {
                Language::De => "Keine Termine im Zeitraum",
                Language::En => "No occurrences in range",
            };
            println!("  {}", none.dimmed());
        }

        for occurrence in &schedule {
            println!("{}", occurrence.render(ctx));
        }

        // Add spacing between events (but not after the last one)
        if i < events.len() - 1 {
            println!();
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct EventSchedule<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    occurrences: Vec<Occurrence>,
}

pub fn run_json(events: &[Event], range: DateRange) -> Result<()> {
    let schedules = events
        .iter()
        .map(|event| -> Result<EventSchedule<'_>> {
            Ok(EventSchedule {
                title: &event.title,
                id: event.id.as_deref(),
                occurrences: event.schedule(range.from, range.to)?.collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    println!("{}", serde_json::to_string_pretty(&schedules)?);
    Ok(())
}
