//! Date window for listing occurrences.

use chrono::{Days, NaiveDate, Utc};

use crate::date::{parse_date, LOCAL_TZ};
use crate::error::{MoaError, MoaResult};

/// Inclusive window of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// The current calendar day in the directory's time zone
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&LOCAL_TZ).date_naive()
}

/// `from` plus `days`, or `InvalidDate` if that leaves chrono's date range.
pub fn days_after(from: NaiveDate, days: i64) -> MoaResult<NaiveDate> {
    u64::try_from(days)
        .ok()
        .and_then(|days| from.checked_add_days(Days::new(days)))
        .ok_or_else(|| {
            MoaError::InvalidDate(format!("{} days after {} is out of range", days, from))
        })
}

impl DateRange {
    /// Build a range from command-line style arguments.
    /// - `from`: YYYY-MM-DD, defaults to `today`
    /// - `to`: YYYY-MM-DD, defaults to `from` + `horizon_days`
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        horizon_days: i64,
        today: NaiveDate,
    ) -> MoaResult<Self> {
        let from = match from {
            Some(s) => parse_date(s)?,
            None => today,
        };

        let to = match to {
            Some(s) => parse_date(s)?,
            None => days_after(from, horizon_days)?,
        };

        if to < from {
            return Err(MoaError::InvalidDate(format!(
                "range ends ({}) before it starts ({})",
                to, from
            )));
        }

        Ok(DateRange { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}
