//! Recurrence expansion.
//!
//! Turns a recurring source event into concrete occurrences for a visible
//! range. Two materialization strategies coexist:
//!
//! - **pattern occurrences**: computed on demand from a single stored source
//!   event by [`expand`]; never persisted individually.
//! - **linked occurrences**: independently persisted events sharing a
//!   `recurrence_group_id`, looked up with [`related_events`] and
//!   edited/deleted independently.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Event, Frequency, IntervalUnit, RecurrenceEnd, RecurrenceRule};

/// A concrete, dated instance of a (possibly recurring) event.
///
/// Carries the source event's time-of-day and duration projected onto the
/// matching date. Virtual: pattern occurrences are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub source_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Whether the event occurs on the given calendar date.
///
/// Non-recurring events occur only on their start date. Recurring events
/// follow the rule's per-frequency arithmetic with interval stepping and
/// termination bounds.
pub fn occurs_on(event: &Event, date: NaiveDate) -> bool {
    let start_date = event.start_time.date_naive();

    let rule = match (&event.recurrence, event.is_recurring) {
        (Some(rule), true) => rule,
        _ => return date == start_date,
    };

    if date < start_date {
        return false;
    }
    if let RecurrenceEnd::OnDate(end) = rule.end {
        // Inclusive end date.
        if date > end.date_naive() {
            return false;
        }
    }

    let interval = rule.interval.max(1) as i64;
    let steps = match steps_since(rule, start_date, date) {
        Some(steps) => steps,
        None => return false,
    };
    if steps % interval != 0 {
        return false;
    }

    if let RecurrenceEnd::AfterOccurrences(count) = rule.end {
        let ordinal = steps / interval + 1;
        if ordinal > count as i64 {
            return false;
        }
    }
    true
}

/// Whole steps between the start date and the candidate, in the rule's unit,
/// or None when the candidate doesn't sit on the rule's anchor (weekday,
/// day-of-month, month+day).
fn steps_since(rule: &RecurrenceRule, start: NaiveDate, date: NaiveDate) -> Option<i64> {
    let days = (date - start).num_days();
    match rule.step_unit() {
        IntervalUnit::Days => Some(days),
        IntervalUnit::Weeks => {
            let matches = if rule.frequency == Frequency::Weekly && !rule.week_days.is_empty() {
                rule.week_days.contains(&weekday_index(date))
            } else {
                weekday_index(date) == weekday_index(start)
            };
            if !matches {
                return None;
            }
            Some(days / 7)
        }
        IntervalUnit::Months => {
            let anchor = match rule.frequency {
                Frequency::Monthly => rule.month_day.unwrap_or(start.day()),
                _ => start.day(),
            };
            if date.day() != anchor {
                return None;
            }
            Some(months_between(start, date))
        }
        IntervalUnit::Years => {
            if date.month() != start.month() || date.day() != start.day() {
                return None;
            }
            Some((date.year() - start.year()) as i64)
        }
    }
}

/// Weekday index with 0=Sunday..6=Saturday.
fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

fn months_between(start: NaiveDate, date: NaiveDate) -> i64 {
    (date.year() as i64 * 12 + date.month() as i64)
        - (start.year() as i64 * 12 + start.month() as i64)
}

/// Expand a (possibly recurring) event into concrete occurrences overlapping
/// the half-open `[range_start, range_end)` window.
///
/// Pure: identical inputs yield identical occurrence lists.
pub fn expand(
    event: &Event,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Vec<Occurrence> {
    if range_end <= range_start {
        return Vec::new();
    }

    let duration = event.end_time - event.start_time;
    let time_of_day = event.start_time.time();

    // An occurrence starting before the window can still reach into it when
    // the source spans midnight, so back up by one duration.
    let first_date = event.start_time.date_naive();
    let mut date = (range_start - duration).date_naive().max(first_date);
    let last_date = range_end.date_naive();

    let mut occurrences = Vec::new();
    while date <= last_date {
        if occurs_on(event, date) {
            let start_time = Utc.from_utc_datetime(&date.and_time(time_of_day));
            let end_time = start_time + duration;
            if start_time < range_end && range_start < end_time {
                occurrences.push(Occurrence {
                    source_id: event.id.clone(),
                    start_time,
                    end_time,
                });
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    occurrences
}

/// For a linked event, all events sharing its `recurrence_group_id` ordered
/// by start time; for a non-grouped event, the singleton `[event]`.
pub fn related_events<'a>(event: &'a Event, all: &'a [Event]) -> Vec<&'a Event> {
    match &event.recurrence_group_id {
        Some(group_id) => {
            let mut cohort: Vec<&Event> = all
                .iter()
                .filter(|e| e.recurrence_group_id.as_deref() == Some(group_id.as_str()))
                .collect();
            cohort.sort_by_key(|e| e.start_time);
            cohort
        }
        None => vec![event],
    }
}
