//! Recurrence descriptor types.
//!
//! An event's schedule is one variant of [`Recurrence`]. The variant decides
//! which fields exist at all, so a weekly rule cannot carry a day-of-month and
//! a one-off event cannot carry a weekday set.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{MoaError, MoaResult};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays, iterated Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.iter().copied().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Day of month in 1..=31. Months shorter than this day are skipped, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayOfMonth(u32);

impl DayOfMonth {
    pub fn new(day: i64) -> MoaResult<Self> {
        if !(1..=31).contains(&day) {
            return Err(MoaError::invalid_descriptor(format!(
                "monthlyDayOfMonth must be between 1 and 31, got {}",
                day
            )));
        }
        Ok(DayOfMonth(day as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Which occurrence of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekIndex {
    First,
    Second,
    Third,
    Fourth,
    /// The final matching weekday of the month (4th or 5th)
    Last,
}

impl WeekIndex {
    /// Signed ordinal as used in an RRULE `BYDAY` entry (`-1` for the last)
    fn rrule_ordinal(self) -> i8 {
        match self {
            WeekIndex::First => 1,
            WeekIndex::Second => 2,
            WeekIndex::Third => 3,
            WeekIndex::Fourth => 4,
            WeekIndex::Last => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyRule {
    DayOfMonth(DayOfMonth),
    NthWeekday { index: WeekIndex, weekday: Weekday },
}

fn rrule_day(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// The repetition pattern of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Once,
    Daily,
    Weekly(WeekdaySet),
    Monthly(MonthlyRule),
    /// Same month and day as the anchor date each year
    Yearly,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::Once)
    }

    /// RFC 5545 RRULE value for this pattern, without `UNTIL`.
    ///
    /// `None` for one-off events. Yearly rules carry no `BY*` parts, so the
    /// month and day come from DTSTART and a Feb 29 anchor only matches in
    /// leap years. `BYMONTHDAY` likewise skips months that lack the day.
    pub fn to_rrule(&self) -> Option<String> {
        let rule = match self {
            Recurrence::Once => return None,
            Recurrence::Daily => "FREQ=DAILY".to_string(),
            Recurrence::Weekly(days) => {
                let days: Vec<&str> = days.iter().map(rrule_day).collect();
                format!("FREQ=WEEKLY;BYDAY={}", days.join(","))
            }
            Recurrence::Monthly(MonthlyRule::DayOfMonth(day)) => {
                format!("FREQ=MONTHLY;BYMONTHDAY={}", day.get())
            }
            Recurrence::Monthly(MonthlyRule::NthWeekday { index, weekday }) => format!(
                "FREQ=MONTHLY;BYDAY={}{}",
                index.rrule_ordinal(),
                rrule_day(*weekday)
            ),
            Recurrence::Yearly => "FREQ=YEARLY".to_string(),
        };
        Some(rule)
    }
}

/// A recurrence pattern plus its optional inclusive end date.
///
/// On the wire this uses the flat field layout of the events collection
/// (`eventType`, `daysOfWeek`, `monthlyMode`, ...); see [`super::RawRecurrence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "super::RawRecurrence", into = "super::RawRecurrence")]
pub struct RecurrenceDescriptor {
    pub rule: Recurrence,
    pub repeat_until: Option<NaiveDate>,
}

impl Default for RecurrenceDescriptor {
    fn default() -> Self {
        RecurrenceDescriptor::new(Recurrence::Once)
    }
}

impl RecurrenceDescriptor {
    pub fn new(rule: Recurrence) -> Self {
        RecurrenceDescriptor {
            rule,
            repeat_until: None,
        }
    }

    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self::new(Recurrence::Weekly(days.into_iter().collect()))
    }

    pub fn monthly_on_day(day: i64) -> MoaResult<Self> {
        Ok(Self::new(Recurrence::Monthly(MonthlyRule::DayOfMonth(
            DayOfMonth::new(day)?,
        ))))
    }

    pub fn monthly_on_weekday(index: WeekIndex, weekday: Weekday) -> Self {
        Self::new(Recurrence::Monthly(MonthlyRule::NthWeekday { index, weekday }))
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.repeat_until = Some(date);
        self
    }

    /// Rejects descriptors that can never produce a schedule.
    pub fn validate(&self) -> MoaResult<()> {
        match self.rule {
            Recurrence::Weekly(days) if days.is_empty() => Err(MoaError::invalid_descriptor(
                "weekly event has no daysOfWeek selected",
            )),
            _ => Ok(()),
        }
    }

    /// Last date occurrences may fall on: the earlier of `repeat_until` and the horizon.
    pub fn upper_bound(&self, horizon_end: NaiveDate) -> NaiveDate {
        match self.repeat_until {
            Some(until) => until.min(horizon_end),
            None => horizon_end,
        }
    }
}
