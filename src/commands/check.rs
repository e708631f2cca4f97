use std::path::Path;

use anyhow::Result;
use moafinder_core::document::load_events;
use owo_colors::OwoColorize;

/// Validate every event in the file. Parsing already rejects malformed
/// recurrence fields, so a parse failure is reported the same way.
pub fn run(file: &Path) -> Result<()> {
    let events = match load_events(file) {
        Ok(events) => events,
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            anyhow::bail!("{} is not valid", file.display());
        }
    };

    let mut invalid = 0;
    for event in &events {
        match event.validate() {
            Ok(()) => println!("{} {}", "✓".green(), event.title),
            Err(e) => {
                invalid += 1;
                println!("{} {}: {}", "✗".red(), event.title, e);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} events are not valid", invalid, events.len());
    }

    Ok(())
}
