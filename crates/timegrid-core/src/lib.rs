//! # Timegrid Core Library
//!
//! This library is the scheduling and gesture-editing engine behind the
//! Timegrid calendar. It is a library-level engine consumed by a UI shell:
//! the shell renders grids and forwards pointer samples; the engine owns
//! the event model, conflict detection, recurrence expansion, the
//! gesture state machine, and update orchestration against a remote
//! event store.
//!
//! ## Architecture
//!
//! - **Event Model**: events, tasks, participants, and recurrence rules
//! - **Conflict Detector**: advisory overlap checks and slot search
//! - **Recurrence Expander**: pattern occurrences and linked cohorts
//! - **Gesture Editor**: a state machine turning pointer trajectories
//!   into snapped, clamped time-range proposals
//! - **Update Orchestrator**: optimistic writes, participant-change
//!   confirmation, and recurring-delete resolution
//! - **Sync**: one-way pull from an external OAuth-backed calendar
//!
//! ## Key Components
//!
//! - [`GestureEditor`]: per-surface gesture state machine
//! - [`UpdateOrchestrator`]: the single write path over the shared store
//! - [`EventStore`]: the in-memory event collection
//! - [`EngineConfig`]: TOML-backed engine tunables

pub mod api;
pub mod config;
pub mod conflict;
pub mod error;
pub mod event;
pub mod gesture;
pub mod orchestrator;
pub mod recurrence;
pub mod store;
pub mod sync;

pub use api::{ApiError, EventApi, EventPatch, RecurringDeleteOption, RecurringDeleteOutcome,
    RemoteStoreClient};
pub use config::EngineConfig;
pub use conflict::{
    detect_conflicts, find_next_available_slot, Conflict, ConflictReport, SlotSearchConfig,
};
pub use error::{ConfigError, EngineError, ValidationError};
pub use event::{Event, EventType, Participant, Priority, RecurrenceRule, ReminderRule};
pub use gesture::{EditorEvent, GestureEditor, GestureInput, GridMetrics, ProposedEdit};
pub use orchestrator::{
    NotificationDispatch, PendingConfirmation, UpdateOrchestrator, UpdateOutcome,
};
pub use recurrence::{expand, occurs_on, related_events, Occurrence};
pub use store::EventStore;
pub use sync::{ExternalCalendarSync, SyncConfig, SyncError, SyncOutcome};
