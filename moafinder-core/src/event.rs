//! Directory event and its schedule.
//!
//! Mirrors one document of the events collection: the anchor `startDate`,
//! optional `endDate` for multi-day single occurrences, the wall-clock
//! `time` window and the recurrence fields, stored flat next to them.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::date_range::days_after;
use crate::error::{MoaError, MoaResult};
use crate::recurrence::{resolve_occurrences, Occurrences, RecurrenceDescriptor};

/// Wall-clock window of a single occurrence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(
        default,
        with = "crate::date::time_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<NaiveTime>,

    #[serde(
        default,
        with = "crate::date::time_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    pub title: String,

    #[serde(with = "crate::date::flexible")]
    pub start_date: NaiveDate,

    #[serde(
        default,
        with = "crate::date::flexible_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeRange>,

    #[serde(flatten)]
    pub recurrence: RecurrenceDescriptor,

    /// Set once on save; see [`Event::prepare_for_save`]
    #[serde(
        default,
        with = "crate::date::flexible_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<NaiveDate>,
}

/// Ids are strings or integers depending on the collection's database adapter
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    }))
}

/// One dated instance of an event, with its wall-clock window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    /// Last day of this instance; later than `date` for multi-day events
    pub end_date: NaiveDate,
    pub from: Option<NaiveTime>,
    pub to: Option<NaiveTime>,
}

impl Occurrence {
    pub fn is_all_day(&self) -> bool {
        self.from.is_none()
    }
}

impl Event {
    pub fn new(title: impl Into<String>, start_date: NaiveDate) -> Self {
        Event {
            id: None,
            title: title.into(),
            start_date,
            end_date: None,
            time: None,
            recurrence: RecurrenceDescriptor::default(),
            expiry_date: None,
        }
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceDescriptor) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// URL-friendly name, used where no id has been assigned yet
    pub fn slug(&self) -> String {
        slug::slugify(&self.title)
    }

    pub fn validate(&self) -> MoaResult<()> {
        self.recurrence.validate()?;

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(MoaError::InvalidDate(format!(
                    "endDate {} is before startDate {}",
                    end, self.start_date
                )));
            }
        }

        Ok(())
    }

    /// Expiry as derived from the current fields: `repeatUntil`, else
    /// `endDate`, else `startDate`.
    pub fn derived_expiry_date(&self) -> NaiveDate {
        self.recurrence
            .repeat_until
            .or(self.end_date)
            .unwrap_or(self.start_date)
    }

    /// Fill in `expiry_date` the way a save does. A stored value is left
    /// untouched, so later edits to the schedule do not move it.
    pub fn prepare_for_save(&mut self) {
        if self.expiry_date.is_none() {
            let expiry = self.derived_expiry_date();
            tracing::debug!(title = %self.title, %expiry, "setting expiry date");
            self.expiry_date = Some(expiry);
        }
    }

    /// Overwrite the stored expiry with the one derived from the current fields.
    pub fn recompute_expiry_date(&mut self) -> NaiveDate {
        let expiry = self.derived_expiry_date();
        self.expiry_date = Some(expiry);
        expiry
    }

    pub fn effective_expiry_date(&self) -> NaiveDate {
        self.expiry_date
            .unwrap_or_else(|| self.derived_expiry_date())
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.effective_expiry_date() < today
    }

    /// All occurrences from the anchor date up to `horizon_end`.
    pub fn occurrences(&self, horizon_end: NaiveDate) -> MoaResult<Occurrences> {
        resolve_occurrences(self.start_date, &self.recurrence, horizon_end)
    }

    /// Occurrences falling inside `[from, to]`.
    pub fn occurrences_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> MoaResult<impl Iterator<Item = NaiveDate> + Clone> {
        Ok(self.occurrences(to)?.skip_while(move |d| *d < from))
    }

    /// Occurrences from `today` through the next `horizon_days` days.
    pub fn upcoming(
        &self,
        today: NaiveDate,
        horizon_days: i64,
    ) -> MoaResult<impl Iterator<Item = NaiveDate> + Clone> {
        self.occurrences_between(today, days_after(today, horizon_days)?)
    }

    pub fn next_occurrence(&self, today: NaiveDate, horizon_days: i64) -> MoaResult<Option<NaiveDate>> {
        Ok(self.upcoming(today, horizon_days)?.next())
    }

    pub fn occurs_on(&self, date: NaiveDate) -> MoaResult<bool> {
        Ok(self.occurrences_between(date, date)?.next().is_some())
    }

    /// Occurrences in `[from, to]` paired with the event's time window.
    pub fn schedule(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> MoaResult<impl Iterator<Item = Occurrence> + Clone> {
        let span = self
            .end_date
            .map(|end| end - self.start_date)
            .filter(|span| *span > Duration::zero())
            .unwrap_or_else(Duration::zero);
        let time = self.time.unwrap_or_default();

        Ok(self
            .occurrences_between(from, to)?
            .map(move |date| Occurrence {
                date,
                end_date: date + span,
                from: time.from,
                to: time.to,
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{Recurrence, WeekIndex};
    use chrono::Weekday;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_collection_document() {
        let doc = json!({
            "id": 42,
            "title": "Nachbarschaftscafé",
            "startDate": "2023-12-31T23:00:00.000Z",
            "time": { "from": "15:00", "to": "17:30" },
            "eventType": "wöchentlich",
            "daysOfWeek": ["mon", "wed"],
            "repeatUntil": "2024-03-31",
            "location": { "id": "abc", "name": "Stadtschloss Moabit" },
            "createdAt": "2023-12-01T10:00:00.000Z",
        });

        let event: Event = serde_json::from_value(doc).unwrap();

        assert_eq!(event.id.as_deref(), Some("42"));
        assert_eq!(event.start_date, date(2024, 1, 1));
        assert_eq!(
            event.time,
            Some(TimeRange {
                from: NaiveTime::from_hms_opt(15, 0, 0),
                to: NaiveTime::from_hms_opt(17, 30, 0),
            })
        );
        assert_eq!(
            event.recurrence,
            RecurrenceDescriptor::weekly([Weekday::Mon, Weekday::Wed]).until(date(2024, 3, 31))
        );
        assert_eq!(event.expiry_date, None);
    }

    #[test]
    fn test_deserialize_rejects_invalid_descriptor() {
        let doc = json!({
            "title": "Flohmarkt",
            "startDate": "2024-01-01",
            "eventType": "monatlich",
        });

        let err = serde_json::from_value::<Event>(doc).unwrap_err();
        assert!(err.to_string().contains("monthlyMode"), "got: {}", err);
    }

    #[test]
    fn test_expiry_preference_order() {
        let mut event = Event::new("Lesung", date(2024, 1, 10));
        assert_eq!(event.derived_expiry_date(), date(2024, 1, 10));

        event.end_date = Some(date(2024, 1, 12));
        assert_eq!(event.derived_expiry_date(), date(2024, 1, 12));

        event.recurrence = RecurrenceDescriptor::new(Recurrence::Daily).until(date(2024, 2, 1));
        assert_eq!(event.derived_expiry_date(), date(2024, 2, 1));
    }

    #[test]
    fn test_expiry_is_not_recomputed_after_save() {
        let mut event = Event::new("Lesung", date(2024, 1, 10));
        event.prepare_for_save();
        assert_eq!(event.expiry_date, Some(date(2024, 1, 10)));

        event.recurrence = RecurrenceDescriptor::new(Recurrence::Daily).until(date(2024, 6, 1));
        event.prepare_for_save();
        assert_eq!(event.expiry_date, Some(date(2024, 1, 10)));
        assert!(event.is_expired(date(2024, 1, 11)));

        assert_eq!(event.recompute_expiry_date(), date(2024, 6, 1));
        assert!(!event.is_expired(date(2024, 1, 11)));
    }

    #[test]
    fn test_occurrences_between_filters_window() {
        let event = Event::new("Repair Café", date(2024, 1, 1))
            .with_recurrence(RecurrenceDescriptor::weekly([Weekday::Mon, Weekday::Wed]));

        let dates: Vec<_> = event
            .occurrences_between(date(2024, 1, 5), date(2024, 1, 15))
            .unwrap()
            .collect();
        assert_eq!(dates, vec![date(2024, 1, 8), date(2024, 1, 10), date(2024, 1, 15)]);
    }

    #[test]
    fn test_next_occurrence_and_occurs_on() {
        let event = Event::new("Kiezspaziergang", date(2024, 1, 1)).with_recurrence(
            RecurrenceDescriptor::monthly_on_weekday(WeekIndex::Last, Weekday::Fri),
        );

        assert_eq!(
            event.next_occurrence(date(2024, 2, 1), 90).unwrap(),
            Some(date(2024, 2, 23))
        );
        assert!(event.occurs_on(date(2024, 3, 29)).unwrap());
        assert!(!event.occurs_on(date(2024, 3, 22)).unwrap());
        assert_eq!(event.next_occurrence(date(2024, 2, 1), 10).unwrap(), None);
    }

    #[test]
    fn test_horizon_out_of_range_is_an_error() {
        let event = Event::new("Kiezspaziergang", date(2024, 1, 1))
            .with_recurrence(RecurrenceDescriptor::new(Recurrence::Daily));

        let err = event.next_occurrence(date(2024, 1, 1), 100_000_000).unwrap_err();
        assert!(matches!(err, MoaError::InvalidDate(_)));
    }

    #[test]
    fn test_schedule_carries_time_and_span() {
        let mut event = Event::new("Kiezfest", date(2024, 6, 14));
        event.end_date = Some(date(2024, 6, 16));
        event.time = Some(TimeRange {
            from: NaiveTime::from_hms_opt(12, 0, 0),
            to: None,
        });

        let schedule: Vec<_> = event
            .schedule(date(2024, 6, 1), date(2024, 6, 30))
            .unwrap()
            .collect();

        assert_eq!(
            schedule,
            vec![Occurrence {
                date: date(2024, 6, 14),
                end_date: date(2024, 6, 16),
                from: NaiveTime::from_hms_opt(12, 0, 0),
                to: None,
            }]
        );
        assert!(!schedule[0].is_all_day());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let mut event = Event::new("Konzert", date(2024, 6, 14));
        event.end_date = Some(date(2024, 6, 13));
        assert!(matches!(event.validate(), Err(MoaError::InvalidDate(_))));
    }

    #[test]
    fn test_slug() {
        let event = Event::new("Offenes Singen im Park", date(2024, 6, 14));
        assert_eq!(event.slug(), "offenes-singen-im-park");
    }
}
