//! Expansion of a recurrence descriptor into concrete dates.
//!
//! Recurring rules are expanded by the rrule crate from the descriptor's
//! RRULE form, anchored at midnight UTC on the start date.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use chrono::{NaiveDate, NaiveTime};
use rrule::{RRuleSet, Tz};

use super::descriptor::RecurrenceDescriptor;
use crate::error::{MoaError, MoaResult};

/// Dates fetched from the rule set per expansion call
const PAGE_SIZE: u16 = 512;

/// Latest date an RRULE `UNTIL` can express
const LAST_EXPANDABLE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(date) => date,
    None => panic!("9999-12-31 is a valid date"),
};

/// Resolve the dates an event occurs on, from its anchor `start` up to
/// `horizon_end` (and never past `repeat_until`).
///
/// The returned iterator is lazy and owns its expanded rule set, so it
/// can be cloned to replay the same sequence. Dates are strictly ascending.
///
/// ## Errors
///
/// `InvalidDescriptor` if the descriptor cannot describe any schedule, e.g. a
/// weekly rule without weekdays. An empty range is not an error.
pub fn resolve_occurrences(
    start: NaiveDate,
    descriptor: &RecurrenceDescriptor,
    horizon_end: NaiveDate,
) -> MoaResult<Occurrences> {
    descriptor.validate()?;

    let upper = descriptor.upper_bound(horizon_end).min(LAST_EXPANDABLE_DATE);

    tracing::debug!(
        %start,
        %upper,
        rule = ?descriptor.rule,
        "resolving occurrences"
    );

    let mut occurrences = Occurrences {
        rule_set: None,
        start,
        upper,
        pending: VecDeque::new(),
        fetched_through: None,
        last: None,
    };

    if upper < start {
        return Ok(occurrences);
    }

    match descriptor.rule.to_rrule() {
        None => occurrences.pending.push_back(start),
        Some(rule) => occurrences.rule_set = Some(build_rule_set(start, &rule, upper)?),
    }

    Ok(occurrences)
}

fn rrule_timestamp(date: NaiveDate) -> String {
    format!("{}T000000Z", date.format("%Y%m%d"))
}

/// Build the rule set the way an iCalendar file would spell it: DTSTART, then
/// the RRULE bounded by UNTIL.
fn build_rule_set(start: NaiveDate, rule: &str, upper: NaiveDate) -> MoaResult<RRuleSet> {
    let source = format!(
        "DTSTART:{}\nRRULE:{};UNTIL={}",
        rrule_timestamp(start),
        rule,
        rrule_timestamp(upper)
    );

    source.parse::<RRuleSet>().map_err(|e| {
        MoaError::invalid_descriptor(format!("Cannot expand recurrence '{}': {}", rule, e))
    })
}

/// Lazy sequence of occurrence dates produced by [`resolve_occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    /// Remaining expansion source; `None` once every page has been fetched
    rule_set: Option<RRuleSet>,
    start: NaiveDate,
    upper: NaiveDate,
    pending: VecDeque<NaiveDate>,
    fetched_through: Option<NaiveDate>,
    last: Option<NaiveDate>,
}

impl Occurrences {
    /// Expand the next page of dates from the rule set into `pending`.
    fn fetch_page(&mut self) {
        let Some(rule_set) = &self.rule_set else {
            return;
        };

        let mut page = rule_set.clone();
        if let Some(through) = self.fetched_through {
            let after = through.and_time(NaiveTime::MIN).and_utc();
            page = page.after(after.with_timezone(&Tz::UTC));
        }

        let dates = page.all(PAGE_SIZE).dates;
        if dates.len() < usize::from(PAGE_SIZE) {
            self.rule_set = None;
        }

        let dates: Vec<NaiveDate> = dates.iter().map(|dt| dt.date_naive()).collect();
        if let Some(&newest) = dates.last() {
            if self.fetched_through.is_some_and(|through| newest <= through) {
                // No progress; the rule set has nothing left past this point
                self.rule_set = None;
            }
            self.fetched_through = Some(newest);
        }
        self.pending.extend(dates);
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        loop {
            if self.pending.is_empty() {
                self.fetch_page();
            }
            let date = self.pending.pop_front()?;

            if date < self.start || date > self.upper {
                continue;
            }
            if self.last.is_some_and(|last| date <= last) {
                continue;
            }

            self.last = Some(date);
            return Some(date);
        }
    }
}

impl FusedIterator for Occurrences {}
