//! Human-readable schedule labels ("jeden Montag und Mittwoch bis 31.03.2024").

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::MoaError;
use crate::recurrence::{MonthlyRule, Recurrence, RecurrenceDescriptor, WeekIndex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    En,
}

impl FromStr for Language {
    type Err = MoaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" | "deutsch" => Ok(Language::De),
            "en" | "english" => Ok(Language::En),
            other => Err(MoaError::Parse(format!("Unknown language '{}'", other))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::De => write!(f, "de"),
            Language::En => write!(f, "en"),
        }
    }
}

fn weekday_name(day: Weekday, lang: Language) -> &'static str {
    match (lang, day) {
        (Language::De, Weekday::Mon) => "Montag",
        (Language::De, Weekday::Tue) => "Dienstag",
        (Language::De, Weekday::Wed) => "Mittwoch",
        (Language::De, Weekday::Thu) => "Donnerstag",
        (Language::De, Weekday::Fri) => "Freitag",
        (Language::De, Weekday::Sat) => "Samstag",
        (Language::De, Weekday::Sun) => "Sonntag",
        (Language::En, Weekday::Mon) => "Monday",
        (Language::En, Weekday::Tue) => "Tuesday",
        (Language::En, Weekday::Wed) => "Wednesday",
        (Language::En, Weekday::Thu) => "Thursday",
        (Language::En, Weekday::Fri) => "Friday",
        (Language::En, Weekday::Sat) => "Saturday",
        (Language::En, Weekday::Sun) => "Sunday",
    }
}

fn week_index_name(index: WeekIndex, lang: Language) -> &'static str {
    match (lang, index) {
        (Language::De, WeekIndex::First) => "ersten",
        (Language::De, WeekIndex::Second) => "zweiten",
        (Language::De, WeekIndex::Third) => "dritten",
        (Language::De, WeekIndex::Fourth) => "vierten",
        (Language::De, WeekIndex::Last) => "letzten",
        (Language::En, WeekIndex::First) => "first",
        (Language::En, WeekIndex::Second) => "second",
        (Language::En, WeekIndex::Third) => "third",
        (Language::En, WeekIndex::Fourth) => "fourth",
        (Language::En, WeekIndex::Last) => "last",
    }
}

/// "a", "a und b", "a, b und c"
fn join_list(items: &[&str], lang: Language) -> String {
    let and = match lang {
        Language::De => "und",
        Language::En => "and",
    };

    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), and, last),
    }
}

pub fn format_date(date: NaiveDate, lang: Language) -> String {
    match lang {
        Language::De => date.format("%d.%m.%Y").to_string(),
        Language::En => date.format("%Y-%m-%d").to_string(),
    }
}

/// Describe when an event anchored on `start` takes place.
pub fn describe(descriptor: &RecurrenceDescriptor, start: NaiveDate, lang: Language) -> String {
    let pattern = match (descriptor.rule, lang) {
        (Recurrence::Once, Language::De) => format!("einmalig am {}", format_date(start, lang)),
        (Recurrence::Once, Language::En) => format!("once on {}", format_date(start, lang)),
        (Recurrence::Daily, Language::De) => "täglich".to_string(),
        (Recurrence::Daily, Language::En) => "daily".to_string(),
        (Recurrence::Weekly(days), _) => {
            let names: Vec<&str> = days.iter().map(|d| weekday_name(d, lang)).collect();
            match lang {
                Language::De => format!("jeden {}", join_list(&names, lang)),
                Language::En => format!("every {}", join_list(&names, lang)),
            }
        }
        (Recurrence::Monthly(MonthlyRule::DayOfMonth(day)), Language::De) => {
            format!("am {}. jedes Monats", day.get())
        }
        (Recurrence::Monthly(MonthlyRule::DayOfMonth(day)), Language::En) => {
            format!("on day {} of every month", day.get())
        }
        (Recurrence::Monthly(MonthlyRule::NthWeekday { index, weekday }), Language::De) => {
            format!(
                "jeden {} {} im Monat",
                week_index_name(index, lang),
                weekday_name(weekday, lang)
            )
        }
        (Recurrence::Monthly(MonthlyRule::NthWeekday { index, weekday }), Language::En) => {
            format!(
                "every {} {} of the month",
                week_index_name(index, lang),
                weekday_name(weekday, lang)
            )
        }
        (Recurrence::Yearly, Language::De) => {
            format!("jährlich am {:02}.{:02}.", start.day(), start.month())
        }
        (Recurrence::Yearly, Language::En) => format!("yearly on {}", start.format("%B %-d")),
    };

    match (descriptor.repeat_until, descriptor.rule.is_recurring()) {
        (Some(until), true) => {
            let until_word = match lang {
                Language::De => "bis",
                Language::En => "until",
            };
            format!("{} {} {}", pattern, until_word, format_date(until, lang))
        }
        _ => pattern,
    }
}
