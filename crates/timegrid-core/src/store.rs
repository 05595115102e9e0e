//! In-memory event collection.
//!
//! The one shared mutable resource in the engine. All mutation funnels
//! through the [`crate::orchestrator::UpdateOrchestrator`] (and the sync
//! pull's subset replacement), which is what preserves the
//! optimistic-then-reconcile invariant.

use chrono::{DateTime, Utc};

use crate::event::Event;

/// Mutable collection of events, passed by reference into the orchestrator
/// and the conflict detector.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Seed the store with an initial event list (e.g. a remote `list` result).
    pub fn with_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All events, in insertion order.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Events overlapping the half-open range, ordered by start time.
    pub fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Event> {
        let mut hits: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.overlaps_range(start, end))
            .collect();
        hits.sort_by_key(|e| e.start_time);
        hits
    }

    /// Insert or replace by id. Returns a reference to the stored event.
    pub fn upsert(&mut self, event: Event) -> &Event {
        match self.events.iter().position(|e| e.id == event.id) {
            Some(idx) => {
                self.events[idx] = event;
                &self.events[idx]
            }
            None => {
                self.events.push(event);
                self.events.last().expect("just pushed")
            }
        }
    }

    /// Remove by id. Returns the removed event if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Event> {
        let idx = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(idx))
    }

    /// Swap an event's identifier in place (not-found repair after an
    /// implicit create assigned a new remote id).
    pub fn replace_id(&mut self, old_id: &str, new_id: impl Into<String>) -> bool {
        match self.events.iter_mut().find(|e| e.id == old_id) {
            Some(event) => {
                event.id = new_id.into();
                true
            }
            None => false,
        }
    }

    /// Replace the subset of events whose ids carry the given provenance
    /// prefix with a freshly pulled batch. Used by the one-way calendar sync.
    pub fn replace_prefixed(&mut self, prefix: &str, batch: Vec<Event>) -> usize {
        self.events.retain(|e| !e.id.starts_with(prefix));
        let added = batch.len();
        self.events.extend(batch);
        added
    }
}
