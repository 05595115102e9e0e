//! Event types for the scheduling engine.
//!
//! An [`Event`] is the atomic schedulable unit: appointments and tasks,
//! optionally recurring, optionally linked to a CRM client record.
//! Timestamps use wall-clock semantics in UTC throughout the engine.

pub mod recurrence;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub use recurrence::{Frequency, IntervalUnit, RecurrenceEnd, RecurrenceRule};

use crate::error::ValidationError;

/// Display duration assigned to tasks on save. The stored duration is not
/// authoritative for task-ness; consumers key off [`EventType::Task`].
pub const TASK_DISPLAY_MINUTES: i64 = 30;

/// Kind of schedulable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Calendar appointment with an authoritative time range.
    Event,
    /// Task pinned to the grid; duration is display-only.
    Task,
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Event
    }
}

/// Priority level for color coding and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Role of a participant on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Organizer,
    Required,
    Optional,
}

/// Participant response to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    NeedsAction,
    Accepted,
    Declined,
    Tentative,
}

impl Default for ResponseStatus {
    fn default() -> Self {
        ResponseStatus::NeedsAction
    }
}

/// A person attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: ParticipantRole,
    #[serde(default)]
    pub response: ResponseStatus,
}

/// Unit of a reminder's lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

/// A reminder rule: fire `value` units before the event starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRule {
    pub value: u32,
    pub trigger: ReminderUnit,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ReminderRule {
    /// Lead time before the event start.
    pub fn lead_time(&self) -> Duration {
        let v = self.value as i64;
        match self.trigger {
            ReminderUnit::Minutes => Duration::minutes(v),
            ReminderUnit::Hours => Duration::hours(v),
            ReminderUnit::Days => Duration::days(v),
            ReminderUnit::Weeks => Duration::weeks(v),
        }
    }
}

/// The atomic schedulable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier, unique within the owning account.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// When true, start/end are normalized to day boundaries on save.
    #[serde(default)]
    pub all_day: bool,
    /// True when start and end fall on different calendar dates.
    /// Kept on the wire for the mobile shell; refreshed on save.
    #[serde(default)]
    pub multi_day: bool,
    #[serde(default, rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: Priority,
    /// Free-text domain tag, used only for color coding.
    pub service: Option<String>,
    /// Optional link to an external CRM record.
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    /// Present only when `is_recurring`.
    pub recurrence: Option<RecurrenceRule>,
    /// Shared identifier for a cohort of linked occurrences.
    pub recurrence_group_id: Option<String>,
    /// Back-reference to the defining occurrence. Non-owning; used only
    /// for lookup, never for cascading ownership.
    pub parent_event_id: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub notifications: Vec<ReminderRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with a generated id.
    ///
    /// # Panics
    /// Panics if `end_time <= start_time`. Use [`try_new`](Self::try_new)
    /// for a non-panicking version.
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self::try_new(title, start_time, end_time)
            .expect("Event::new: end_time must be greater than start_time")
    }

    /// Create a new event, returning a Result.
    ///
    /// # Errors
    /// Returns an error if `end_time <= start_time`.
    pub fn try_new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if end_time <= start_time {
            return Err(ValidationError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        let now = Utc::now();
        Ok(Self {
            id: format!("event-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            start_time,
            end_time,
            all_day: false,
            multi_day: start_time.date_naive() != end_time.date_naive(),
            event_type: EventType::Event,
            priority: Priority::Medium,
            service: None,
            client_id: None,
            client_name: None,
            is_recurring: false,
            recurrence: None,
            recurrence_group_id: None,
            parent_event_id: None,
            participants: Vec::new(),
            notifications: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get duration in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Check if this event overlaps a half-open time range.
    /// Touching endpoints do not overlap.
    pub fn overlaps_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Check if this event overlaps another.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlaps_range(other.start_time, other.end_time)
    }

    /// True when start and end fall on different calendar dates.
    pub fn spans_days(&self) -> bool {
        self.start_time.date_naive() != self.end_time.date_naive()
    }

    /// Normalize the event for persistence:
    /// - all-day events snap to day boundaries (start-of-day to
    ///   start-of-day-after-end, exclusive midnight);
    /// - tasks get the fixed display duration;
    /// - `multi_day` is refreshed from the final bounds.
    pub fn normalize_for_save(&mut self) {
        if self.all_day {
            let start_day = self.start_time.date_naive();
            let end_day = self.end_time.date_naive();
            self.start_time = Utc.from_utc_datetime(&start_day.and_time(chrono::NaiveTime::MIN));
            self.end_time = Utc
                .from_utc_datetime(&(end_day + Duration::days(1)).and_time(chrono::NaiveTime::MIN));
        }
        if self.event_type == EventType::Task {
            self.end_time = self.start_time + Duration::minutes(TASK_DISPLAY_MINUTES);
        }
        self.multi_day = self.spans_days();
    }

    /// Set the event type.
    pub fn with_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the service tag.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Link a CRM client record.
    pub fn with_client(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self.client_name = Some(name.into());
        self
    }

    /// Attach a recurrence rule.
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.is_recurring = true;
        self.recurrence = Some(rule);
        self
    }

    /// Add a participant.
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }
}
