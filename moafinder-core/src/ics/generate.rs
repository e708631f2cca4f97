//! ICS file generation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::constants::{ICS_PRODID, UID_DOMAIN};
use crate::date::LOCAL_TZ;
use crate::error::{MoaError, MoaResult};
use crate::event::{Event, Occurrence};

/// Generate a VCALENDAR with one VEVENT per occurrence.
///
/// `dtstamp` is passed in rather than read from the clock so output is
/// reproducible.
pub fn occurrences_to_ics(
    event: &Event,
    occurrences: impl IntoIterator<Item = Occurrence>,
    dtstamp: DateTime<Utc>,
) -> MoaResult<String> {
    let mut cal = Calendar::new();
    let base_uid = base_uid(event);

    for occurrence in occurrences {
        let uid = format!(
            "{}-{}@{}",
            base_uid,
            occurrence.date.format("%Y%m%d"),
            UID_DOMAIN
        );
        cal.push(build_vevent(event, &occurrence, &uid, dtstamp)?.done());
    }

    Ok(finish_calendar(cal))
}

/// Generate a VCALENDAR with a single VEVENT that carries the event's RRULE.
///
/// DTSTART is the first resolved occurrence, so clients expanding the rule see
/// the same dates as [`occurrences_to_ics`]. An event without any occurrence
/// yields an empty calendar.
pub fn event_to_ics(event: &Event, dtstamp: DateTime<Utc>) -> MoaResult<String> {
    let mut cal = Calendar::new();

    if let Some(first) = event.schedule(event.start_date, NaiveDate::MAX)?.next() {
        let uid = format!("{}@{}", base_uid(event), UID_DOMAIN);
        let mut ics_event = build_vevent(event, &first, &uid, dtstamp)?;

        if let Some(rule) = event.recurrence.rule.to_rrule() {
            let rrule = match event.recurrence.repeat_until {
                Some(until) => format!("{};UNTIL={}", rule, format_until(until, first.is_all_day())?),
                None => rule,
            };
            ics_event.add_property("RRULE", &rrule);
        }

        cal.push(ics_event.done());
    }

    Ok(finish_calendar(cal))
}

fn base_uid(event: &Event) -> String {
    event.id.clone().unwrap_or_else(|| event.slug())
}

fn build_vevent(
    event: &Event,
    occurrence: &Occurrence,
    uid: &str,
    dtstamp: DateTime<Utc>,
) -> MoaResult<icalendar::Event> {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(uid);
    ics_event.summary(&event.title);
    ics_event.add_property("DTSTAMP", &dtstamp.format("%Y%m%dT%H%M%SZ").to_string());

    match occurrence.from {
        None => {
            // All-day: DTEND is exclusive
            add_date_property(&mut ics_event, "DTSTART", occurrence.date);
            add_date_property(
                &mut ics_event,
                "DTEND",
                occurrence.end_date + Duration::days(1),
            );
        }
        Some(from) => {
            let start = occurrence.date.and_time(from);
            let end = occurrence_end(occurrence, start)?;
            add_datetime_property(&mut ics_event, "DTSTART", start);
            add_datetime_property(&mut ics_event, "DTEND", end);
        }
    }

    Ok(ics_event)
}

/// UNTIL in the form RFC 5545 pairs with DTSTART: a plain date for all-day
/// events, otherwise the last second of that day in UTC.
fn format_until(until: NaiveDate, all_day: bool) -> MoaResult<String> {
    if all_day {
        return Ok(until.format("%Y%m%d").to_string());
    }

    let utc = until
        .and_hms_opt(23, 59, 59)
        .and_then(|last_second| LOCAL_TZ.from_local_datetime(&last_second).earliest())
        .ok_or_else(|| MoaError::IcsGenerate(format!("{} has no local end of day", until)))?
        .with_timezone(&Utc);

    Ok(utc.format("%Y%m%dT%H%M%SZ").to_string())
}

fn finish_calendar(mut cal: Calendar) -> String {
    let ics = strip_ics_bloat(&cal.done().to_string());
    if ics.contains(";TZID=") {
        insert_vtimezone(&ics)
    } else {
        ics
    }
}

/// End of a timed occurrence. Without `to`, the occurrence lasts one hour.
fn occurrence_end(occurrence: &Occurrence, start: NaiveDateTime) -> MoaResult<NaiveDateTime> {
    let end = match occurrence.to {
        Some(to) => occurrence.end_date.and_time(to),
        None => start + Duration::hours(1),
    };

    if end < start {
        return Err(MoaError::IcsGenerate(format!(
            "occurrence on {} ends before it starts",
            occurrence.date
        )));
    }
    Ok(end)
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, datetime: NaiveDateTime) {
    let mut prop = Property::new(name, datetime.format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", LOCAL_TZ.name());
    ics_event.append_property(prop);
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(ICS_PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Europe/Berlin rules since 1996, for TZID references in DTSTART/DTEND
const BERLIN_VTIMEZONE: [&str; 17] = [
    "BEGIN:VTIMEZONE",
    "TZID:Europe/Berlin",
    "BEGIN:DAYLIGHT",
    "TZOFFSETFROM:+0100",
    "TZOFFSETTO:+0200",
    "TZNAME:CEST",
    "DTSTART:19700329T020000",
    "RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU",
    "END:DAYLIGHT",
    "BEGIN:STANDARD",
    "TZOFFSETFROM:+0200",
    "TZOFFSETTO:+0100",
    "TZNAME:CET",
    "DTSTART:19701025T030000",
    "RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU",
    "END:STANDARD",
    "END:VTIMEZONE",
];

/// Add the VTIMEZONE component ahead of the first VEVENT.
fn insert_vtimezone(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len() + 512);
    let mut inserted = false;

    for line in ics.lines() {
        if !inserted && line == "BEGIN:VEVENT" {
            for tz_line in BERLIN_VTIMEZONE {
                result.push_str(tz_line);
                result.push_str("\r\n");
            }
            inserted = true;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TimeRange;
    use crate::recurrence::RecurrenceDescriptor;
    use chrono::{NaiveTime, TimeZone, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dtstamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn weekly_event() -> Event {
        let mut event = Event::new("Repair Café", date(2024, 1, 1))
            .with_recurrence(RecurrenceDescriptor::weekly([Weekday::Mon, Weekday::Wed]));
        event.id = Some("evt-7".to_string());
        event
    }

    #[test]
    fn test_one_vevent_per_occurrence() {
        let event = weekly_event();
        let schedule = event.schedule(date(2024, 1, 1), date(2024, 1, 15)).unwrap();

        let ics = occurrences_to_ics(&event, schedule, dtstamp()).unwrap();

        let count = ics.lines().filter(|l| *l == "BEGIN:VEVENT").count();
        assert_eq!(count, 5, "ICS:\n{}", ics);
        assert!(ics.contains("UID:evt-7-20240103@moafinder"), "ICS:\n{}", ics);
        assert!(ics.contains("PRODID:MOAFINDER"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn test_all_day_occurrence_has_value_date() {
        let event = weekly_event();
        let schedule = event.schedule(date(2024, 1, 1), date(2024, 1, 1)).unwrap();

        let ics = occurrences_to_ics(&event, schedule, dtstamp()).unwrap();

        assert!(
            ics.contains("DTSTART;VALUE=DATE:20240101"),
            "DTSTART should have VALUE=DATE parameter. ICS:\n{}",
            ics
        );
        assert!(
            ics.contains("DTEND;VALUE=DATE:20240102"),
            "DTEND should be the exclusive next day. ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_timed_occurrence_uses_berlin_tzid() {
        let mut event = weekly_event();
        event.time = Some(TimeRange {
            from: NaiveTime::from_hms_opt(18, 0, 0),
            to: NaiveTime::from_hms_opt(20, 30, 0),
        });
        let schedule = event.schedule(date(2024, 1, 3), date(2024, 1, 3)).unwrap();

        let ics = occurrences_to_ics(&event, schedule, dtstamp()).unwrap();

        assert!(
            ics.contains("DTSTART;TZID=Europe/Berlin:20240103T180000"),
            "ICS:\n{}",
            ics
        );
        assert!(
            ics.contains("DTEND;TZID=Europe/Berlin:20240103T203000"),
            "ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_uid_falls_back_to_slug() {
        let mut event = weekly_event();
        event.id = None;
        let schedule = event.schedule(date(2024, 1, 1), date(2024, 1, 1)).unwrap();

        let ics = occurrences_to_ics(&event, schedule, dtstamp()).unwrap();
        assert!(ics.contains("UID:repair-cafe-20240101@moafinder"), "ICS:\n{}", ics);
    }

    #[test]
    fn test_end_before_start_is_an_error() {
        let mut event = weekly_event();
        event.time = Some(TimeRange {
            from: NaiveTime::from_hms_opt(20, 0, 0),
            to: NaiveTime::from_hms_opt(18, 0, 0),
        });
        let schedule = event.schedule(date(2024, 1, 1), date(2024, 1, 1)).unwrap();

        let err = occurrences_to_ics(&event, schedule, dtstamp()).unwrap_err();
        assert!(matches!(err, MoaError::IcsGenerate(_)));
    }

    #[test]
    fn test_vtimezone_only_for_timed_events() {
        let mut event = weekly_event();
        let schedule = event.schedule(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let all_day = occurrences_to_ics(&event, schedule, dtstamp()).unwrap();
        assert!(!all_day.contains("VTIMEZONE"), "ICS:\n{}", all_day);

        event.time = Some(TimeRange {
            from: NaiveTime::from_hms_opt(18, 0, 0),
            to: None,
        });
        let schedule = event.schedule(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        let timed = occurrences_to_ics(&event, schedule, dtstamp()).unwrap();

        assert_eq!(timed.matches("BEGIN:VTIMEZONE").count(), 1, "ICS:\n{}", timed);
        assert!(timed.contains("TZID:Europe/Berlin"));
        let tz_at = timed.find("BEGIN:VTIMEZONE").unwrap();
        let event_at = timed.find("BEGIN:VEVENT").unwrap();
        assert!(tz_at < event_at, "VTIMEZONE must precede the events. ICS:\n{}", timed);
    }

    #[test]
    fn test_event_to_ics_carries_rrule() {
        let mut event = weekly_event();
        event.recurrence = event.recurrence.clone().until(date(2024, 3, 31));

        let ics = event_to_ics(&event, dtstamp()).unwrap();

        assert_eq!(ics.lines().filter(|l| *l == "BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("UID:evt-7@moafinder"), "ICS:\n{}", ics);
        assert!(ics.contains("DTSTART;VALUE=DATE:20240101"), "ICS:\n{}", ics);
        assert!(
            ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO,WE;UNTIL=20240331"),
            "ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_event_to_ics_starts_at_first_occurrence() {
        // 2024-01-04 is a Thursday; the first matching day is Monday the 8th
        let mut event = Event::new("Repair Café", date(2024, 1, 4))
            .with_recurrence(RecurrenceDescriptor::weekly([Weekday::Mon]).until(date(2024, 3, 31)));
        event.time = Some(TimeRange {
            from: NaiveTime::from_hms_opt(18, 0, 0),
            to: NaiveTime::from_hms_opt(20, 0, 0),
        });

        let ics = event_to_ics(&event, dtstamp()).unwrap();

        assert!(
            ics.contains("DTSTART;TZID=Europe/Berlin:20240108T180000"),
            "ICS:\n{}",
            ics
        );
        // End of 2024-03-31 in Berlin (CEST) is 21:59:59 UTC
        assert!(
            ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO;UNTIL=20240331T215959Z"),
            "ICS:\n{}",
            ics
        );
        assert!(ics.contains("BEGIN:VTIMEZONE"));
    }

    #[test]
    fn test_event_to_ics_once_has_no_rrule() {
        let event = Event::new("Flohmarkt", date(2024, 5, 4));

        let ics = event_to_ics(&event, dtstamp()).unwrap();

        assert!(ics.contains("DTSTART;VALUE=DATE:20240504"), "ICS:\n{}", ics);
        assert!(!ics.contains("RRULE"), "ICS:\n{}", ics);
    }
}
