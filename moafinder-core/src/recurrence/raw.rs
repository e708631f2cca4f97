//! Flat field layout of the events collection.
//!
//! The collection keeps every recurrence field side by side and only shows the
//! ones relevant to the selected `eventType` in the admin form. Stale values
//! from a previous type stay in the document and are ignored here.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::descriptor::{
    DayOfMonth, MonthlyRule, Recurrence, RecurrenceDescriptor, WeekIndex, WeekdaySet,
};
use crate::error::{MoaError, MoaResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[default]
    #[serde(rename = "once", alias = "einmalig")]
    Once,
    #[serde(rename = "daily", alias = "täglich")]
    Daily,
    #[serde(rename = "weekly", alias = "wöchentlich")]
    Weekly,
    #[serde(rename = "monthly", alias = "monatlich")]
    Monthly,
    #[serde(rename = "yearly", alias = "jährlich")]
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyMode {
    DayOfMonth,
    NthWeekday,
}

/// Weekday token as stored in `daysOfWeek` / `monthlyWeekday`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayToken {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<DayToken> for Weekday {
    fn from(token: DayToken) -> Self {
        match token {
            DayToken::Mon => Weekday::Mon,
            DayToken::Tue => Weekday::Tue,
            DayToken::Wed => Weekday::Wed,
            DayToken::Thu => Weekday::Thu,
            DayToken::Fri => Weekday::Fri,
            DayToken::Sat => Weekday::Sat,
            DayToken::Sun => Weekday::Sun,
        }
    }
}

impl From<Weekday> for DayToken {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayToken::Mon,
            Weekday::Tue => DayToken::Tue,
            Weekday::Wed => DayToken::Wed,
            Weekday::Thu => DayToken::Thu,
            Weekday::Fri => DayToken::Fri,
            Weekday::Sat => DayToken::Sat,
            Weekday::Sun => DayToken::Sun,
        }
    }
}

/// Recurrence fields exactly as the events collection stores them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecurrence {
    #[serde(default)]
    pub event_type: EventType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<DayToken>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_mode: Option<MonthlyMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_day_of_month: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_week_index: Option<WeekIndex>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_weekday: Option<DayToken>,

    #[serde(
        default,
        with = "crate::date::flexible_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub repeat_until: Option<NaiveDate>,
}

impl RawRecurrence {
    fn monthly_rule(&self) -> MoaResult<MonthlyRule> {
        match self.monthly_mode {
            None => Err(MoaError::invalid_descriptor(
                "monthly event has no monthlyMode",
            )),
            Some(MonthlyMode::DayOfMonth) => {
                let day = self.monthly_day_of_month.ok_or_else(|| {
                    MoaError::invalid_descriptor("monthlyMode dayOfMonth requires monthlyDayOfMonth")
                })?;
                Ok(MonthlyRule::DayOfMonth(DayOfMonth::new(day)?))
            }
            Some(MonthlyMode::NthWeekday) => match (self.monthly_week_index, self.monthly_weekday) {
                (Some(index), Some(weekday)) => Ok(MonthlyRule::NthWeekday {
                    index,
                    weekday: weekday.into(),
                }),
                _ => Err(MoaError::invalid_descriptor(
                    "monthlyMode nthWeekday requires monthlyWeekIndex and monthlyWeekday",
                )),
            },
        }
    }
}

impl TryFrom<RawRecurrence> for RecurrenceDescriptor {
    type Error = MoaError;

    fn try_from(raw: RawRecurrence) -> MoaResult<Self> {
        let rule = match raw.event_type {
            EventType::Once => Recurrence::Once,
            EventType::Daily => Recurrence::Daily,
            EventType::Weekly => {
                let days: WeekdaySet = raw
                    .days_of_week
                    .iter()
                    .flatten()
                    .map(|t| Weekday::from(*t))
                    .collect();
                Recurrence::Weekly(days)
            }
            EventType::Monthly => Recurrence::Monthly(raw.monthly_rule()?),
            EventType::Yearly => Recurrence::Yearly,
        };

        let descriptor = RecurrenceDescriptor {
            rule,
            repeat_until: raw.repeat_until,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

impl From<RecurrenceDescriptor> for RawRecurrence {
    fn from(descriptor: RecurrenceDescriptor) -> Self {
        let mut raw = RawRecurrence {
            repeat_until: descriptor.repeat_until,
            ..RawRecurrence::default()
        };

        match descriptor.rule {
            Recurrence::Once => raw.event_type = EventType::Once,
            Recurrence::Daily => raw.event_type = EventType::Daily,
            Recurrence::Weekly(days) => {
                raw.event_type = EventType::Weekly;
                raw.days_of_week = Some(days.iter().map(DayToken::from).collect());
            }
            Recurrence::Monthly(MonthlyRule::DayOfMonth(day)) => {
                raw.event_type = EventType::Monthly;
                raw.monthly_mode = Some(MonthlyMode::DayOfMonth);
                raw.monthly_day_of_month = Some(i64::from(day.get()));
            }
            Recurrence::Monthly(MonthlyRule::NthWeekday { index, weekday }) => {
                raw.event_type = EventType::Monthly;
                raw.monthly_mode = Some(MonthlyMode::NthWeekday);
                raw.monthly_week_index = Some(index);
                raw.monthly_weekday = Some(weekday.into());
            }
            Recurrence::Yearly => raw.event_type = EventType::Yearly,
        }

        raw
    }
}
