//! Reading event documents from disk.
//!
//! JSON files are what the events REST endpoint returns: a single document,
//! `{"doc": {...}}` after a create/update, or a paginated `{"docs": [...]}`
//! listing. TOML files hold one event at the top level or several under
//! `[[events]]`.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{MoaError, MoaResult};
use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> MoaResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(DocumentFormat::Json),
            Some("toml") => Ok(DocumentFormat::Toml),
            _ => Err(MoaError::Parse(format!(
                "Cannot tell format of {}. Expected a .json or .toml file",
                path.display()
            ))),
        }
    }
}

pub fn load_events(path: &Path) -> MoaResult<Vec<Event>> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let events = parse_events(&content, format)?;

    tracing::debug!(path = %path.display(), count = events.len(), "loaded events");
    Ok(events)
}

pub fn parse_events(content: &str, format: DocumentFormat) -> MoaResult<Vec<Event>> {
    match format {
        DocumentFormat::Json => parse_json(content),
        DocumentFormat::Toml => parse_toml(content),
    }
}

fn parse_json(content: &str) -> MoaResult<Vec<Event>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| MoaError::Parse(e.to_string()))?;

    let docs = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("docs") {
                items
            } else if let Some(doc @ Value::Object(_)) = map.remove("doc") {
                vec![doc]
            } else {
                vec![Value::Object(map)]
            }
        }
        other => {
            return Err(MoaError::Parse(format!(
                "Expected an event object or list, got {}",
                other
            )));
        }
    };

    docs.into_iter()
        .enumerate()
        .map(|(i, doc)| {
            serde_json::from_value(doc)
                .map_err(|e| MoaError::Parse(format!("event #{}: {}", i + 1, e)))
        })
        .collect()
}

fn parse_toml(content: &str) -> MoaResult<Vec<Event>> {
    #[derive(Deserialize)]
    struct EventList {
        events: Vec<Event>,
    }

    let table: toml::Table = toml::from_str(content).map_err(|e| MoaError::Parse(e.to_string()))?;

    if table.contains_key("events") {
        let list: EventList =
            toml::from_str(content).map_err(|e| MoaError::Parse(e.to_string()))?;
        Ok(list.events)
    } else {
        let event: Event = toml::from_str(content).map_err(|e| MoaError::Parse(e.to_string()))?;
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_json_single_listing_and_wrapped() {
        let single = r#"{"title": "A", "startDate": "2024-01-01"}"#;
        let wrapped = r#"{"doc": {"title": "A", "startDate": "2024-01-01"}, "message": "ok"}"#;
        let listing = r#"{
            "docs": [
                {"title": "A", "startDate": "2024-01-01"},
                {"title": "B", "startDate": "2024-01-02", "eventType": "täglich"}
            ],
            "totalDocs": 2,
            "page": 1
        }"#;

        assert_eq!(parse_events(single, DocumentFormat::Json).unwrap().len(), 1);
        assert_eq!(parse_events(wrapped, DocumentFormat::Json).unwrap()[0].title, "A");

        let events = parse_events(listing, DocumentFormat::Json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].title, "B");
    }

    #[test]
    fn test_json_error_names_the_event() {
        let listing = r#"[
            {"title": "A", "startDate": "2024-01-01"},
            {"title": "B", "startDate": "2024-01-02", "eventType": "weekly", "daysOfWeek": []}
        ]"#;

        let err = parse_events(listing, DocumentFormat::Json).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("event #2"), "got: {}", message);
        assert!(message.contains("daysOfWeek"), "got: {}", message);
    }

    #[test]
    fn test_toml_single_event() {
        let content = r#"
title = "Kiezspaziergang"
startDate = "2024-01-01"
eventType = "monthly"
monthlyMode = "nthWeekday"
monthlyWeekIndex = "last"
monthlyWeekday = "fri"

[time]
from = "16:00"
"#;

        let events = parse_events(content, DocumentFormat::Toml).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].next_occurrence(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 90).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 23)
        );
    }

    #[test]
    fn test_toml_event_list() {
        let content = r#"
[[events]]
title = "A"
startDate = "2024-01-01"

[[events]]
title = "B"
startDate = "2024-01-02"
eventType = "yearly"
"#;

        let events = parse_events(content, DocumentFormat::Toml).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("events.json")).unwrap(),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("cafe.toml")).unwrap(),
            DocumentFormat::Toml
        );
        assert!(DocumentFormat::from_path(Path::new("events.csv")).is_err());
    }
}
