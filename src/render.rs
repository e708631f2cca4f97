//! Terminal rendering for moafinder types.
//!
//! Extension traits that add colored output to moafinder-core types
//! using owo_colors.

use chrono::{Datelike, NaiveDate, Weekday};
use moafinder_core::event::{Event, Occurrence};
use moafinder_core::label::{describe, format_date, Language};
use owo_colors::OwoColorize;

/// What rendering depends on besides the value itself
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub today: NaiveDate,
    pub lang: Language,
}

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self, ctx: RenderContext) -> String;
}

impl Render for Event {
    fn render(&self, ctx: RenderContext) -> String {
        let label = describe(&self.recurrence, self.start_date, ctx.lang);
        format!("{} {}", self.title.bold(), format!("({})", label).dimmed())
    }
}

impl Render for Occurrence {
    fn render(&self, ctx: RenderContext) -> String {
        let RenderContext { today, lang } = ctx;
        let date = format_date_label(self.date, today, lang);
        let mut line = format!("  {:<16} {}", date, format_time(self, lang));

        if self.end_date > self.date {
            let until = match lang {
                Language::De => "bis",
                Language::En => "until",
            };
            let span = format!("{} {}", until, format_date(self.end_date, lang));
            line.push_str(&format!(" {}", span.dimmed()));
        }

        if self.date == today {
            line.green().to_string()
        } else {
            line
        }
    }
}

fn short_weekday(day: Weekday, lang: Language) -> &'static str {
    match lang {
        Language::De => match day {
            Weekday::Mon => "Mo",
            Weekday::Tue => "Di",
            Weekday::Wed => "Mi",
            Weekday::Thu => "Do",
            Weekday::Fri => "Fr",
            Weekday::Sat => "Sa",
            Weekday::Sun => "So",
        },
        Language::En => match day {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        },
    }
}

/// Format a date as a human-readable label (e.g. "Heute", "Morgen", "Mi 03.01.2024")
pub fn format_date_label(date: NaiveDate, today: NaiveDate, lang: Language) -> String {
    match ((date - today).num_days(), lang) {
        (0, Language::De) => "Heute".to_string(),
        (1, Language::De) => "Morgen".to_string(),
        (0, Language::En) => "Today".to_string(),
        (1, Language::En) => "Tomorrow".to_string(),
        _ => format!(
            "{} {}",
            short_weekday(date.weekday(), lang),
            format_date(date, lang)
        ),
    }
}

/// Format the time window of an occurrence (e.g. "15:00–17:30" or "ganztägig")
pub fn format_time(occurrence: &Occurrence, lang: Language) -> String {
    match (occurrence.from, occurrence.to) {
        (Some(from), Some(to)) => format!("{}–{}", from.format("%H:%M"), to.format("%H:%M")),
        (Some(from), None) => match lang {
            Language::De => format!("ab {}", from.format("%H:%M")),
            Language::En => format!("from {}", from.format("%H:%M")),
        },
        (None, _) => match lang {
            Language::De => "ganztägig".to_string(),
            Language::En => "all-day".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn occurrence(from: Option<NaiveTime>, to: Option<NaiveTime>) -> Occurrence {
        Occurrence {
            date: date(2024, 1, 3),
            end_date: date(2024, 1, 3),
            from,
            to,
        }
    }

    #[test]
    fn test_format_date_label() {
        let today = date(2024, 1, 1);
        assert_eq!(format_date_label(today, today, Language::De), "Heute");
        assert_eq!(format_date_label(date(2024, 1, 2), today, Language::En), "Tomorrow");
        assert_eq!(
            format_date_label(date(2024, 1, 3), today, Language::De),
            "Mi 03.01.2024"
        );
        assert_eq!(
            format_date_label(date(2024, 1, 3), today, Language::En),
            "Wed 2024-01-03"
        );
    }

    #[test]
    fn test_format_time() {
        let from = NaiveTime::from_hms_opt(15, 0, 0);
        let to = NaiveTime::from_hms_opt(17, 30, 0);

        assert_eq!(format_time(&occurrence(from, to), Language::De), "15:00–17:30");
        assert_eq!(format_time(&occurrence(from, None), Language::De), "ab 15:00");
        assert_eq!(format_time(&occurrence(None, None), Language::De), "ganztägig");
        assert_eq!(format_time(&occurrence(None, None), Language::En), "all-day");
    }
}
