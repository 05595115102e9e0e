//! Scheduling conflict detection.
//!
//! Conflicts are advisory, never blocking: the engine never refuses a save
//! because of a double-booking, it only surfaces the overlap. Two ranges
//! conflict iff `start1 < end2 && start2 < end1` -- half-open, so touching
//! endpoints do not conflict.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Detail of a single overlap between a proposed range and an existing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub event_id: String,
    pub title: String,
    pub overlap_start: DateTime<Utc>,
    pub overlap_end: DateTime<Utc>,
    pub overlap_minutes: i64,
    /// Human-readable summary for the confirmation UI.
    pub summary: String,
}

/// Result of a conflict check. `can_proceed` is always true -- double
/// bookings are surfaced, never rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<Conflict>,
    pub can_proceed: bool,
}

/// Check a proposed range against existing events.
///
/// `exclude` removes the event being edited (matched by identity) from
/// consideration, so an event never conflicts with itself during a move.
pub fn detect_conflicts(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &[Event],
    exclude: Option<&str>,
) -> ConflictReport {
    let conflicts: Vec<Conflict> = conflicting_events(start, end, existing, exclude)
        .into_iter()
        .map(|event| {
            let overlap_start = start.max(event.start_time);
            let overlap_end = end.min(event.end_time);
            let overlap_minutes = (overlap_end - overlap_start).num_minutes();
            Conflict {
                event_id: event.id.clone(),
                title: event.title.clone(),
                overlap_start,
                overlap_end,
                overlap_minutes,
                summary: format!(
                    "Overlaps \"{}\" for {} min ({} - {})",
                    event.title,
                    overlap_minutes,
                    overlap_start.format("%H:%M"),
                    overlap_end.format("%H:%M"),
                ),
            }
        })
        .collect();

    ConflictReport {
        has_conflicts: !conflicts.is_empty(),
        conflicts,
        can_proceed: true,
    }
}

/// Raw overlapping events for live highlighting during a drag.
/// Cheap enough to recompute on every gesture sample.
pub fn conflicting_events<'a>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    existing: &'a [Event],
    exclude: Option<&str>,
) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|e| exclude != Some(e.id.as_str()))
        .filter(|e| e.overlaps_range(start, end))
        .collect()
}

/// Parameters for [`find_next_available_slot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSearchConfig {
    /// First working hour of the day (inclusive).
    pub work_hours_start: u32,
    /// Last working hour of the day (exclusive).
    pub work_hours_end: u32,
    /// Step between candidate start times, in minutes.
    pub interval_minutes: i64,
    /// Search window bound, in hours.
    pub horizon_hours: i64,
}

impl Default for SlotSearchConfig {
    fn default() -> Self {
        Self {
            work_hours_start: 8,
            work_hours_end: 18,
            interval_minutes: 15,
            horizon_hours: 24,
        }
    }
}

/// Walk forward from `from` in fixed intervals, skipping non-working hours,
/// until a `duration_minutes`-sized gap with zero conflicts is found.
/// Returns the first such instant, or None within the bounded horizon.
pub fn find_next_available_slot(
    from: DateTime<Utc>,
    duration_minutes: i64,
    existing: &[Event],
    config: &SlotSearchConfig,
) -> Option<DateTime<Utc>> {
    if duration_minutes <= 0 || config.interval_minutes <= 0 {
        return None;
    }
    let horizon = from + Duration::hours(config.horizon_hours);
    let mut candidate = round_up_to_interval(from, config.interval_minutes);

    while candidate < horizon {
        let slot_end = candidate + Duration::minutes(duration_minutes);

        if !within_work_hours(candidate, slot_end, config) {
            candidate = next_work_start(candidate, config);
            continue;
        }

        if conflicting_events(candidate, slot_end, existing, None).is_empty() {
            return Some(candidate);
        }
        candidate += Duration::minutes(config.interval_minutes);
    }
    None
}

fn round_up_to_interval(t: DateTime<Utc>, interval_minutes: i64) -> DateTime<Utc> {
    let minute_of_day = (t.hour() as i64) * 60 + t.minute() as i64;
    let rem = minute_of_day % interval_minutes;
    let mut rounded = t - Duration::seconds(t.second() as i64);
    if rem != 0 || t.second() != 0 {
        rounded += Duration::minutes(interval_minutes - rem);
    }
    rounded
}

fn within_work_hours(start: DateTime<Utc>, end: DateTime<Utc>, config: &SlotSearchConfig) -> bool {
    let day_work_start = with_hour(start, config.work_hours_start);
    let day_work_end = with_hour(start, config.work_hours_end);
    start >= day_work_start && end <= day_work_end
}

/// The next working-day start at or after `t`.
fn next_work_start(t: DateTime<Utc>, config: &SlotSearchConfig) -> DateTime<Utc> {
    let today_start = with_hour(t, config.work_hours_start);
    if t < today_start {
        today_start
    } else {
        with_hour(t + Duration::days(1), config.work_hours_start)
    }
}

fn with_hour(t: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    use chrono::TimeZone;
    let day = t.date_naive();
    let naive = day
        .and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN));
    Utc.from_utc_datetime(&naive)
}
