use anyhow::Result;
use chrono::NaiveDate;
use moafinder_core::date::format_date;
use moafinder_core::event::Event;
use owo_colors::OwoColorize;

pub fn run(events: &[Event], today: NaiveDate) -> Result<()> {
    for event in events {
        let mut saved = event.clone();
        saved.prepare_for_save();
        let expiry = saved.effective_expiry_date();

        let stored = match event.expiry_date {
            Some(stored) if stored != event.derived_expiry_date() => {
                format!(" (stored, derived would be {})", format_date(event.derived_expiry_date()))
            }
            Some(_) => " (stored)".to_string(),
            None => String::new(),
        };

        let line = format!("{}  {}{}", format_date(expiry), event.title, stored.dimmed());
        if saved.is_expired(today) {
            println!("{} {}", line.red(), "expired".red());
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}
