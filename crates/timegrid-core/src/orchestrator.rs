//! Update orchestration.
//!
//! Applies confirmed edits with an optimistic-write protocol: local state
//! mutates immediately and synchronously, the remote commit runs
//! asynchronously, and on success the local record reconciles with the
//! authoritative response. On transport failure the optimistic mutation is
//! deliberately **not** rolled back -- drag interactions stay responsive
//! while the remote store is degraded, at the cost of transient
//! local/remote divergence. The one exception is the recurring bulk
//! delete, which removes nothing locally until the remote confirms.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::{ApiError, EventApi, EventPatch, RecurringDeleteOption, RecurringDeleteOutcome};
use crate::event::Event;
use crate::gesture::ProposedEdit;
use crate::recurrence::{expand, related_events};
use crate::store::EventStore;

/// Participant notification intent. Delivery is the host application's
/// concern; the engine only raises the boolean intent at confirmation time.
pub trait NotificationDispatch: Send + Sync {
    fn time_change(&self, event: &Event, old_start: DateTime<Utc>, old_end: DateTime<Utc>);
}

/// Default sink that drops every intent.
pub struct NoNotifications;

impl NotificationDispatch for NoNotifications {
    fn time_change(&self, _event: &Event, _old_start: DateTime<Utc>, _old_end: DateTime<Utc>) {}
}

/// A time change held back by the participant-notification gate.
///
/// Carries the old/new time pairs for the confirmation UI and the deferred
/// patch. There is no timeout: this is a genuine external wait, resolved
/// only by [`UpdateOrchestrator::confirm_pending`] or
/// [`UpdateOrchestrator::cancel_pending`].
#[derive(Debug, Clone)]
pub struct PendingConfirmation {
    pub event_id: String,
    pub old_start: DateTime<Utc>,
    pub old_end: DateTime<Utc>,
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
    patch: EventPatch,
}

/// Result of an update request.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The change is in local state (and reconciled when the remote agreed).
    Applied(Event),
    /// Held by the participant gate; resolve via `confirm_pending` /
    /// `cancel_pending`.
    AwaitingConfirmation,
    /// Validation failed or the id is unknown locally; nothing was mutated.
    Rejected,
}

/// The affected-id set for a recurring delete: cohort members are ordered
/// by start time and partitioned around the target's position.
pub fn affected_ids(
    cohort: &[&Event],
    target_id: &str,
    option: RecurringDeleteOption,
) -> Vec<String> {
    let position = match cohort.iter().position(|e| e.id == target_id) {
        Some(position) => position,
        None => return Vec::new(),
    };
    let selected: Vec<&&Event> = match option {
        RecurringDeleteOption::ThisOnly => cohort.iter().skip(position).take(1).collect(),
        RecurringDeleteOption::AllPrevious => cohort.iter().take(position).collect(),
        RecurringDeleteOption::ThisAndFollowing => cohort.iter().skip(position).collect(),
        RecurringDeleteOption::All => cohort.iter().collect(),
    };
    selected.into_iter().map(|e| e.id.clone()).collect()
}

/// Applies confirmed edits against the shared event collection and the
/// remote store. All mutation funnels through here.
pub struct UpdateOrchestrator<A: EventApi> {
    store: Arc<Mutex<EventStore>>,
    api: A,
    notifier: Box<dyn NotificationDispatch>,
    pending: Option<PendingConfirmation>,
}

impl<A: EventApi> UpdateOrchestrator<A> {
    pub fn new(store: Arc<Mutex<EventStore>>, api: A) -> Self {
        Self {
            store,
            api,
            notifier: Box::new(NoNotifications),
            pending: None,
        }
    }

    /// Replace the notification intent sink.
    pub fn with_notifier(mut self, notifier: Box<dyn NotificationDispatch>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> Arc<Mutex<EventStore>> {
        Arc::clone(&self.store)
    }

    /// The held time change, if the participant gate is waiting.
    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Create an event: optimistic local insert, then remote commit.
    /// Returns None only for validation failures; remote failures keep the
    /// optimistic record and are logged.
    pub async fn create_event(&mut self, mut event: Event) -> Option<Event> {
        if event.end_time <= event.start_time {
            warn!(event_id = %event.id, "rejected create with inverted time range");
            return None;
        }
        event.normalize_for_save();

        let local_id = event.id.clone();
        {
            let mut store = self.store.lock().expect("event store poisoned");
            store.upsert(event.clone());
        }

        match self.api.create(&event).await {
            Ok(remote) => {
                let mut store = self.store.lock().expect("event store poisoned");
                if remote.id != local_id {
                    store.remove(&local_id);
                }
                store.upsert(remote.clone());
                Some(remote)
            }
            Err(err) => {
                warn!(event_id = %local_id, error = %err, "remote create failed; keeping optimistic record");
                Some(event)
            }
        }
    }

    /// Materialize a recurring draft into a cohort of independently
    /// persisted linked occurrences sharing a fresh `recurrence_group_id`.
    /// Unbounded rules are cut off at `horizon_days` past the draft start.
    pub async fn create_linked_series(
        &mut self,
        template: Event,
        horizon_days: i64,
    ) -> Vec<Event> {
        let rule = match &template.recurrence {
            Some(rule) if template.is_recurring => rule.clone(),
            _ => {
                warn!(event_id = %template.id, "create_linked_series without a recurrence rule");
                return Vec::new();
            }
        };
        if rule.validate().is_err() {
            warn!(event_id = %template.id, "create_linked_series with an invalid rule");
            return Vec::new();
        }

        let range_end = template.start_time + chrono::Duration::days(horizon_days.max(1));
        let occurrences = expand(&template, template.start_time, range_end);
        let group_id = format!("group-{}", uuid::Uuid::new_v4());

        let mut created = Vec::new();
        let mut anchor_id: Option<String> = None;
        for occurrence in occurrences {
            let mut member = template.clone();
            member.id = format!("event-{}-{}", Utc::now().timestamp(), uuid::Uuid::new_v4());
            member.start_time = occurrence.start_time;
            member.end_time = occurrence.end_time;
            // Members are independent events; the cohort replaces the rule.
            member.is_recurring = false;
            member.recurrence = None;
            member.recurrence_group_id = Some(group_id.clone());
            member.parent_event_id = anchor_id.clone();

            if let Some(event) = self.create_event(member).await {
                if anchor_id.is_none() {
                    anchor_id = Some(event.id.clone());
                }
                created.push(event);
            }
        }
        created
    }

    // ── Update ───────────────────────────────────────────────────────

    /// Apply partial changes to an event.
    ///
    /// Validation happens before any mutation. When the target has
    /// participants and the patch touches a time field, the change is held
    /// as a [`PendingConfirmation`] instead of applied.
    pub async fn update_event(&mut self, id: &str, patch: EventPatch) -> UpdateOutcome {
        let current = {
            let store = self.store.lock().expect("event store poisoned");
            store.get(id).cloned()
        };
        let current = match current {
            Some(current) => current,
            None => return UpdateOutcome::Rejected,
        };

        let new_start = patch.start_time.unwrap_or(current.start_time);
        let new_end = patch.end_time.unwrap_or(current.end_time);
        if new_end <= new_start {
            warn!(event_id = %id, "rejected update with inverted time range");
            return UpdateOutcome::Rejected;
        }

        if !current.participants.is_empty() && patch.touches_times() {
            self.pending = Some(PendingConfirmation {
                event_id: current.id.clone(),
                old_start: current.start_time,
                old_end: current.end_time,
                new_start,
                new_end,
                patch,
            });
            return UpdateOutcome::AwaitingConfirmation;
        }

        match self.commit_update(id, &patch).await {
            Some(event) => UpdateOutcome::Applied(event),
            None => UpdateOutcome::Rejected,
        }
    }

    /// Resolve the participant gate. With `notify: true` the notification
    /// intent is raised after the commit lands locally.
    pub async fn confirm_pending(&mut self, notify: bool) -> Option<Event> {
        let pending = self.pending.take()?;
        let event = self.commit_update(&pending.event_id, &pending.patch).await?;
        if notify {
            self.notifier
                .time_change(&event, pending.old_start, pending.old_end);
        }
        Some(event)
    }

    /// Discard the held change entirely; no partial effect.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// The optimistic-then-reconcile write path shared by updates and
    /// confirmed pending changes.
    async fn commit_update(&mut self, id: &str, patch: &EventPatch) -> Option<Event> {
        let local = {
            let mut store = self.store.lock().expect("event store poisoned");
            let mut local = store.get(id)?.clone();
            patch.apply_to(&mut local);
            local.normalize_for_save();
            store.upsert(local.clone());
            local
        };

        match self.api.update(id, patch).await {
            Ok(remote) => {
                let mut store = self.store.lock().expect("event store poisoned");
                store.upsert(remote.clone());
                Some(remote)
            }
            Err(ApiError::NotFound) => {
                // The local event was never persisted remotely: fall back
                // to an implicit create with the merged fields, then adopt
                // the server-assigned identifier.
                debug!(event_id = %id, "remote update hit not-found; repairing via create");
                match self.api.create(&local).await {
                    Ok(created) => {
                        let mut store = self.store.lock().expect("event store poisoned");
                        store.remove(id);
                        store.upsert(created.clone());
                        Some(created)
                    }
                    Err(err) => {
                        warn!(event_id = %id, error = %err, "not-found repair failed; keeping optimistic record");
                        Some(local)
                    }
                }
            }
            Err(err) => {
                warn!(event_id = %id, error = %err, "remote update failed; keeping optimistic record");
                Some(local)
            }
        }
    }

    /// Route a gesture commit to the matching write path. Creates arrive
    /// untitled; the edit sheet names them afterwards.
    pub async fn apply_edit(&mut self, edit: ProposedEdit) -> UpdateOutcome {
        match edit {
            ProposedEdit::Create {
                start_time,
                end_time,
                ..
            } => match Event::try_new("New event", start_time, end_time) {
                Ok(event) => match self.create_event(event).await {
                    Some(event) => UpdateOutcome::Applied(event),
                    None => UpdateOutcome::Rejected,
                },
                Err(_) => UpdateOutcome::Rejected,
            },
            ProposedEdit::Move {
                event_id,
                start_time,
                end_time,
            }
            | ProposedEdit::Resize {
                event_id,
                start_time,
                end_time,
            } => {
                self.update_event(&event_id, EventPatch::time_range(start_time, end_time))
                    .await
            }
        }
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Delete a single event: optimistic local removal, remote commit.
    /// Returns false only when the id is unknown locally.
    pub async fn delete_event(&mut self, id: &str) -> bool {
        let removed = {
            let mut store = self.store.lock().expect("event store poisoned");
            store.remove(id)
        };
        if removed.is_none() {
            return false;
        }

        match self.api.delete(id).await {
            Ok(_) => {}
            Err(ApiError::NotFound) => {
                debug!(event_id = %id, "remote delete hit not-found; already gone");
            }
            Err(err) => {
                warn!(event_id = %id, error = %err, "remote delete failed; local removal stands");
            }
        }
        true
    }

    /// Delete across a recurrence cohort.
    ///
    /// Local ids are removed only after the remote confirms them. This is
    /// the one path where remote failure propagates: an incorrect "all
    /// deleted" is worse than an explicit retry prompt.
    pub async fn delete_recurring(
        &mut self,
        id: &str,
        option: RecurringDeleteOption,
    ) -> Result<RecurringDeleteOutcome, ApiError> {
        let (group_id, candidates) = {
            let store = self.store.lock().expect("event store poisoned");
            let target = store.get(id).ok_or(ApiError::NotFound)?;
            let cohort = related_events(target, store.all());
            let group_id = target
                .recurrence_group_id
                .clone()
                .unwrap_or_else(|| target.id.clone());
            (group_id, affected_ids(&cohort, id, option))
        };

        let outcome = self
            .api
            .delete_recurring(id, option, &group_id)
            .await
            .map_err(|err| {
                warn!(event_id = %id, error = %err, "recurring delete failed; no local ids removed");
                err
            })?;

        {
            let mut store = self.store.lock().expect("event store poisoned");
            for confirmed in outcome
                .deleted_ids
                .iter()
                .filter(|id| candidates.contains(id))
            {
                store.remove(confirmed);
            }
        }
        Ok(outcome)
    }
}
