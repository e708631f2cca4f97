//! Calendar date parsing.
//!
//! The events collection stores dates as timestamps (`2024-01-01T00:00:00.000Z`,
//! or `2023-12-31T23:00:00.000Z` when entered in Berlin local time), while
//! hand-written event files use plain `YYYY-MM-DD`. Both reduce to the
//! calendar date as seen in Berlin.

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::error::{MoaError, MoaResult};

/// Timezone the neighbourhood directory lives in
pub const LOCAL_TZ: Tz = chrono_tz::Europe::Berlin;

pub fn parse_date(s: &str) -> MoaResult<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&LOCAL_TZ).date_naive())
        .map_err(|_| {
            MoaError::InvalidDate(format!(
                "'{}'. Expected YYYY-MM-DD or an RFC 3339 timestamp",
                s
            ))
        })
}

/// Parse a wall-clock time such as `18:30` (seconds optional)
pub fn parse_time(s: &str) -> MoaResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| MoaError::Parse(format!("Invalid time '{}'. Expected HH:MM", s)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Serde adapter for a required date field.
pub mod flexible {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an optional date field. Empty strings read as absent.
pub mod flexible_option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&super::format_date(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => super::parse_date(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

/// Serde adapter for an optional wall-clock time. Empty strings read as absent.
pub mod time_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => super::parse_time(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
