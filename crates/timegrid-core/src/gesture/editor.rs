//! Gesture editor state machine.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Dragging(create) -> Editing(placeholder) -> Idle
//! Idle -> Dragging(move | resize) -> Idle
//! ```
//!
//! A drag on empty grid creates a placeholder for fine-tuning before any
//! remote write; a drag on an existing event's body or handles commits on
//! release. All ephemeral state lives in the active [`DragContext`] --
//! including the peak deltas used for release-jitter fallback -- and is
//! destroyed atomically on commit, cancel, or teardown.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::grid::GridMetrics;

/// A single pointer/touch sample in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

/// Which boundary a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Boundary {
    Start,
    End,
}

/// Resize handles. Top/bottom edges exist everywhere; corners exist only
/// on multi-day spans in week view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// The boundary receiving the vertical (time) component.
    fn time_boundary(&self) -> Boundary {
        match self {
            ResizeHandle::Top | ResizeHandle::TopLeft | ResizeHandle::TopRight => Boundary::Start,
            ResizeHandle::Bottom | ResizeHandle::BottomLeft | ResizeHandle::BottomRight => {
                Boundary::End
            }
        }
    }

    /// The boundary receiving the horizontal (date) component, if any.
    fn date_boundary(&self) -> Option<Boundary> {
        match self {
            ResizeHandle::Top | ResizeHandle::Bottom => None,
            ResizeHandle::TopLeft | ResizeHandle::BottomLeft => Some(Boundary::Start),
            ResizeHandle::TopRight | ResizeHandle::BottomRight => Some(Boundary::End),
        }
    }

    fn is_corner(&self) -> bool {
        self.date_boundary().is_some()
    }
}

/// Rendered bounds of an existing event, captured by the surface at press
/// time. The editor never reads the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    pub event_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub multi_day: bool,
    /// Day column of the event's start in the visible grid.
    pub day_index: i32,
    /// Number of day columns the event spans (1 for single-day).
    pub day_span: i32,
}

/// What the pointer landed on when the gesture began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target")]
pub enum PressTarget {
    /// Empty grid space: begins a create drag anchored at the pressed slot.
    EmptySlot {
        day_index: i32,
        at_time: DateTime<Utc>,
    },
    /// An existing event's body: begins a move drag.
    EventBody(EventRef),
    /// An existing event's resize handle.
    EventHandle {
        event: EventRef,
        handle: ResizeHandle,
    },
    /// The active placeholder's body (only meaningful while editing).
    PlaceholderBody,
    /// One of the active placeholder's handles.
    PlaceholderHandle { handle: ResizeHandle },
    /// Anything else; while editing, this discards the placeholder.
    Outside,
}

/// One sample of the gesture stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "input")]
pub enum GestureInput {
    Press { target: PressTarget, at: PointerSample },
    Move { at: PointerSample },
    Release,
    /// Gesture cancel, surface unmount, or explicit cancel affordance.
    Cancel,
    /// The placeholder's confirm affordance.
    Confirm,
}

/// What kind of drag is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Create,
    Move,
    Resize(ResizeHandle),
    PlaceholderMove,
    PlaceholderResize(ResizeHandle),
}

/// Ephemeral state of the active drag. Owned by the editor for the
/// lifetime of one interaction; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragContext {
    pub kind: DragKind,
    pub event_id: Option<String>,
    press: PointerSample,
    origin_start: DateTime<Utc>,
    origin_end: DateTime<Utc>,
    origin_day_index: i32,
    origin_day_span: i32,
    multi_day: bool,
    /// Snapped deltas of the latest sample.
    last_minutes: i64,
    last_days: i64,
    /// Extremes reached during the gesture, for release-jitter fallback.
    peak_minutes: i64,
    peak_days: i64,
}

/// An uncommitted, user-editable proposed time range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_day_index: i32,
    pub day_span: i32,
}

/// Editor states. Entering any non-idle state disables recognition of new
/// creation/move/resize gestures on the surface until the active one
/// resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum EditorState {
    Idle,
    Dragging(DragContext),
    Editing {
        placeholder: Placeholder,
        drag: Option<DragContext>,
    },
}

impl Default for EditorState {
    fn default() -> Self {
        EditorState::Idle
    }
}

/// A confirmed edit handed to the update orchestrator. There is no undo
/// after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "edit")]
pub enum ProposedEdit {
    Create {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        day_index: i32,
        day_span: i32,
    },
    Move {
        event_id: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
    Resize {
        event_id: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
}

/// Events emitted by the transition function. The surface renders
/// proposals, probes conflicts, and forwards commits to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EditorEvent {
    /// The in-flight proposal changed; recompute live conflict highlights
    /// for the carried range (excluding `event_id` if present).
    ProposalChanged {
        event_id: Option<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        day_index: i32,
        day_span: i32,
    },
    /// A create drag released into an editable placeholder.
    PlaceholderOpened { placeholder: Placeholder },
    /// The placeholder's bounds changed (preview during a nested drag, or
    /// settled on release).
    PlaceholderChanged { placeholder: Placeholder },
    /// A final edit for the orchestrator.
    EditCommitted { edit: ProposedEdit },
    /// The interaction ended with no effect.
    Discarded,
}

/// Internal: a computed proposal.
#[derive(Debug, Clone, Copy)]
struct Proposal {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    day_index: i32,
    day_span: i32,
}

impl Proposal {
    fn placeholder(&self) -> Placeholder {
        Placeholder {
            start_time: self.start,
            end_time: self.end,
            start_day_index: self.day_index,
            day_span: self.day_span,
        }
    }
}

/// The gesture editor: one per interactive surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureEditor {
    grid: GridMetrics,
    state: EditorState,
}

impl GestureEditor {
    pub fn new(grid: GridMetrics) -> Self {
        Self {
            grid,
            state: EditorState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, EditorState::Idle)
    }

    pub fn grid(&self) -> &GridMetrics {
        &self.grid
    }

    /// The currently proposed time range, if an interaction is active.
    /// Surfaces feed this to the conflict detector on every sample.
    pub fn proposed_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match &self.state {
            EditorState::Idle => None,
            EditorState::Dragging(ctx) | EditorState::Editing { drag: Some(ctx), .. } => {
                let p = self.proposal(ctx);
                Some((p.start, p.end))
            }
            EditorState::Editing {
                placeholder,
                drag: None,
            } => Some((placeholder.start_time, placeholder.end_time)),
        }
    }

    // ── Transition function ──────────────────────────────────────────

    /// Consume one gesture input. The single entry point: all state lives
    /// in [`EditorState`], so illegal concurrent gestures cannot occur.
    /// Malformed input is absorbed and never interrupts an interaction.
    pub fn apply(&mut self, input: GestureInput) -> Option<EditorEvent> {
        let state = std::mem::take(&mut self.state);
        let (next, event) = self.transition(state, input);
        self.state = next;
        event
    }

    /// Discard any in-progress interaction (surface teardown).
    pub fn reset(&mut self) {
        self.state = EditorState::Idle;
    }

    fn transition(
        &self,
        state: EditorState,
        input: GestureInput,
    ) -> (EditorState, Option<EditorEvent>) {
        match (state, input) {
            // ── Idle ─────────────────────────────────────────────────
            (EditorState::Idle, GestureInput::Press { target, at }) => self.begin(target, at),
            (EditorState::Idle, _) => (EditorState::Idle, None),

            // ── Dragging ─────────────────────────────────────────────
            (EditorState::Dragging(mut ctx), GestureInput::Move { at }) => {
                self.track(&mut ctx, at);
                let p = self.proposal(&ctx);
                let event = EditorEvent::ProposalChanged {
                    event_id: ctx.event_id.clone(),
                    start_time: p.start,
                    end_time: p.end,
                    day_index: p.day_index,
                    day_span: p.day_span,
                };
                (EditorState::Dragging(ctx), Some(event))
            }
            (EditorState::Dragging(mut ctx), GestureInput::Release) => {
                ctx.settle_peaks();
                let p = self.proposal(&ctx);
                match ctx.kind {
                    DragKind::Create => {
                        let placeholder = p.placeholder();
                        (
                            EditorState::Editing {
                                placeholder,
                                drag: None,
                            },
                            Some(EditorEvent::PlaceholderOpened { placeholder }),
                        )
                    }
                    DragKind::Move => {
                        let edit = ProposedEdit::Move {
                            event_id: ctx.event_id.clone().unwrap_or_default(),
                            start_time: p.start,
                            end_time: p.end,
                        };
                        (EditorState::Idle, Some(EditorEvent::EditCommitted { edit }))
                    }
                    DragKind::Resize(_) => {
                        let edit = ProposedEdit::Resize {
                            event_id: ctx.event_id.clone().unwrap_or_default(),
                            start_time: p.start,
                            end_time: p.end,
                        };
                        (EditorState::Idle, Some(EditorEvent::EditCommitted { edit }))
                    }
                    // Placeholder drags never live in Dragging.
                    DragKind::PlaceholderMove | DragKind::PlaceholderResize(_) => {
                        (EditorState::Idle, Some(EditorEvent::Discarded))
                    }
                }
            }
            (EditorState::Dragging(_), GestureInput::Cancel) => {
                (EditorState::Idle, Some(EditorEvent::Discarded))
            }
            // New presses and confirms are not recognized mid-drag.
            (EditorState::Dragging(ctx), GestureInput::Press { .. })
            | (EditorState::Dragging(ctx), GestureInput::Confirm) => {
                (EditorState::Dragging(ctx), None)
            }

            // ── Editing, no nested drag ──────────────────────────────
            (
                EditorState::Editing {
                    placeholder,
                    drag: None,
                },
                GestureInput::Press { target, at },
            ) => match target {
                PressTarget::PlaceholderBody => {
                    let ctx = DragContext::for_placeholder(DragKind::PlaceholderMove, &placeholder, at);
                    (
                        EditorState::Editing {
                            placeholder,
                            drag: Some(ctx),
                        },
                        None,
                    )
                }
                PressTarget::PlaceholderHandle { handle } => {
                    if handle.is_corner() && placeholder.day_span <= 1 {
                        // Corners only exist on multi-day spans; absorb.
                        (
                            EditorState::Editing {
                                placeholder,
                                drag: None,
                            },
                            None,
                        )
                    } else {
                        let ctx = DragContext::for_placeholder(
                            DragKind::PlaceholderResize(handle),
                            &placeholder,
                            at,
                        );
                        (
                            EditorState::Editing {
                                placeholder,
                                drag: Some(ctx),
                            },
                            None,
                        )
                    }
                }
                // Tapping anywhere else discards the placeholder with no
                // side effects.
                _ => (EditorState::Idle, Some(EditorEvent::Discarded)),
            },
            (
                EditorState::Editing {
                    placeholder,
                    drag: None,
                },
                GestureInput::Confirm,
            ) => {
                let edit = ProposedEdit::Create {
                    start_time: placeholder.start_time,
                    end_time: placeholder.end_time,
                    day_index: placeholder.start_day_index,
                    day_span: placeholder.day_span,
                };
                (EditorState::Idle, Some(EditorEvent::EditCommitted { edit }))
            }

            // ── Editing, nested placeholder drag ─────────────────────
            (
                EditorState::Editing {
                    placeholder,
                    drag: Some(mut ctx),
                },
                GestureInput::Move { at },
            ) => {
                self.track(&mut ctx, at);
                let p = self.proposal(&ctx);
                let event = EditorEvent::PlaceholderChanged {
                    placeholder: p.placeholder(),
                };
                (
                    EditorState::Editing {
                        placeholder,
                        drag: Some(ctx),
                    },
                    Some(event),
                )
            }
            (
                EditorState::Editing {
                    drag: Some(mut ctx),
                    ..
                },
                GestureInput::Release,
            ) => {
                ctx.settle_peaks();
                let placeholder = self.proposal(&ctx).placeholder();
                (
                    EditorState::Editing {
                        placeholder,
                        drag: None,
                    },
                    Some(EditorEvent::PlaceholderChanged { placeholder }),
                )
            }

            // Cancellation is total: discard placeholder and drag alike.
            (EditorState::Editing { .. }, GestureInput::Cancel) => {
                (EditorState::Idle, Some(EditorEvent::Discarded))
            }
            (state @ EditorState::Editing { .. }, _) => (state, None),
        }
    }

    // ── Drag bootstrap ───────────────────────────────────────────────

    fn begin(&self, target: PressTarget, at: PointerSample) -> (EditorState, Option<EditorEvent>) {
        match target {
            PressTarget::EmptySlot { day_index, at_time } => {
                let anchor = self.snap_floor_time(at_time);
                let ctx = DragContext {
                    kind: DragKind::Create,
                    event_id: None,
                    press: at,
                    origin_start: anchor,
                    origin_end: anchor + Duration::minutes(self.grid.min_duration_minutes),
                    origin_day_index: day_index,
                    origin_day_span: 1,
                    multi_day: false,
                    last_minutes: 0,
                    last_days: 0,
                    peak_minutes: 0,
                    peak_days: 0,
                };
                let p = self.proposal(&ctx);
                let event = EditorEvent::ProposalChanged {
                    event_id: None,
                    start_time: p.start,
                    end_time: p.end,
                    day_index: p.day_index,
                    day_span: p.day_span,
                };
                (EditorState::Dragging(ctx), Some(event))
            }
            PressTarget::EventBody(event) => match DragContext::for_event(DragKind::Move, &event, at)
            {
                Some(ctx) => (EditorState::Dragging(ctx), None),
                None => (EditorState::Idle, None),
            },
            PressTarget::EventHandle { event, handle } => {
                if handle.is_corner() && !event.multi_day {
                    // Corner handles exist only on multi-day spans; absorb.
                    return (EditorState::Idle, None);
                }
                match DragContext::for_event(DragKind::Resize(handle), &event, at) {
                    Some(ctx) => (EditorState::Dragging(ctx), None),
                    None => (EditorState::Idle, None),
                }
            }
            // No placeholder exists in Idle.
            PressTarget::PlaceholderBody
            | PressTarget::PlaceholderHandle { .. }
            | PressTarget::Outside => (EditorState::Idle, None),
        }
    }

    // ── Sample tracking ──────────────────────────────────────────────

    fn track(&self, ctx: &mut DragContext, at: PointerSample) {
        let raw_minutes = self.grid.minutes_for_pixels(at.y - ctx.press.y);
        let raw_days = self.grid.days_for_pixels(at.x - ctx.press.x);

        let minutes = match ctx.kind {
            DragKind::Create => self.grid.snap_toward_zero(raw_minutes),
            DragKind::Move | DragKind::PlaceholderMove => self.grid.snap_nearest(raw_minutes),
            DragKind::Resize(handle) | DragKind::PlaceholderResize(handle) => {
                let expanding = match handle.time_boundary() {
                    Boundary::Start => raw_minutes < 0,
                    Boundary::End => raw_minutes > 0,
                };
                self.grid.snap_delta(raw_minutes, expanding)
            }
        };

        ctx.last_minutes = minutes;
        ctx.last_days = raw_days;
        if minutes.abs() > ctx.peak_minutes.abs() {
            ctx.peak_minutes = minutes;
        }
        if raw_days.abs() > ctx.peak_days.abs() {
            ctx.peak_days = raw_days;
        }
    }

    // ── Proposal computation ─────────────────────────────────────────

    fn proposal(&self, ctx: &DragContext) -> Proposal {
        match ctx.kind {
            DragKind::Create => self.create_proposal(ctx),
            DragKind::Move | DragKind::PlaceholderMove => self.move_proposal(ctx),
            DragKind::Resize(handle) | DragKind::PlaceholderResize(handle) => {
                self.resize_proposal(ctx, handle)
            }
        }
    }

    fn create_proposal(&self, ctx: &DragContext) -> Proposal {
        let min = Duration::minutes(self.grid.min_duration_minutes);
        let anchor = ctx.origin_start;
        let delta = Duration::minutes(ctx.last_minutes);

        let (mut start, mut end) = if ctx.last_minutes < 0 {
            (anchor + delta, anchor)
        } else {
            (anchor, anchor + delta)
        };
        if end - start < min {
            if ctx.last_minutes < 0 {
                start = end - min;
            } else {
                end = start + min;
            }
        }

        let day_lo = ctx.last_days.min(0);
        let day_hi = ctx.last_days.max(0);
        start += Duration::days(day_lo);
        end += Duration::days(day_hi);
        let day_span = (ctx.last_days.abs() + 1) as i32;

        if day_span == 1 {
            let (s, e) = clamp_to_day(start, end, anchor);
            start = s;
            end = e;
        }

        Proposal {
            start,
            end,
            day_index: ctx.origin_day_index + day_lo as i32,
            day_span,
        }
    }

    fn move_proposal(&self, ctx: &DragContext) -> Proposal {
        let shift = Duration::days(ctx.last_days) + Duration::minutes(ctx.last_minutes);
        let mut start = ctx.origin_start + shift;
        let mut end = ctx.origin_end + shift;

        if !ctx.multi_day {
            // Duration-preserving clamp: slide the whole range back inside
            // its (possibly day-shifted) calendar day.
            let day_anchor = ctx.origin_start + Duration::days(ctx.last_days);
            let (day_start, day_end) = day_bounds(day_anchor);
            if start < day_start {
                let fix = day_start - start;
                start += fix;
                end += fix;
            }
            if end > day_end {
                let fix = end - day_end;
                start -= fix;
                end -= fix;
            }
        }

        Proposal {
            start,
            end,
            day_index: ctx.origin_day_index + ctx.last_days as i32,
            day_span: ctx.origin_day_span,
        }
    }

    fn resize_proposal(&self, ctx: &DragContext, handle: ResizeHandle) -> Proposal {
        let min = Duration::minutes(self.grid.min_duration_minutes);
        let mut start = ctx.origin_start;
        let mut end = ctx.origin_end;
        let mut day_index = ctx.origin_day_index;
        let mut day_span = ctx.origin_day_span;

        // Date component first (corners only), clamped so the span never
        // collapses below one column.
        let mut day_delta = 0i64;
        if let Some(boundary) = handle.date_boundary() {
            day_delta = match boundary {
                Boundary::Start => ctx.last_days.min((ctx.origin_day_span - 1) as i64),
                Boundary::End => ctx.last_days.max(1 - ctx.origin_day_span as i64),
            };
            match boundary {
                Boundary::Start => {
                    start += Duration::days(day_delta);
                    day_index += day_delta as i32;
                    day_span -= day_delta as i32;
                }
                Boundary::End => {
                    end += Duration::days(day_delta);
                    day_span += day_delta as i32;
                }
            }
        }

        // Time component, clamped against the *current* opposite boundary
        // so successive resizes of the same handle compose.
        match handle.time_boundary() {
            Boundary::Start => {
                start += Duration::minutes(ctx.last_minutes);
                if end - start < min {
                    start = end - min;
                }
            }
            Boundary::End => {
                end += Duration::minutes(ctx.last_minutes);
                if end - start < min {
                    end = start + min;
                }
            }
        }

        // Single-day events never cross their day boundary.
        if !ctx.multi_day && day_delta == 0 {
            let (s, e) = clamp_to_day(start, end, ctx.origin_start);
            start = s;
            end = e;
        }

        Proposal {
            start,
            end,
            day_index,
            day_span: day_span.max(1),
        }
    }

    fn snap_floor_time(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        use chrono::Timelike;
        let minute_of_day = (t.hour() as i64) * 60 + t.minute() as i64;
        let snapped = self.grid.snap_floor(minute_of_day);
        let day = t.date_naive();
        Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)) + Duration::minutes(snapped)
    }
}

impl DragContext {
    fn for_event(kind: DragKind, event: &EventRef, at: PointerSample) -> Option<Self> {
        // Malformed bounds are absorbed, not propagated: the gesture layer
        // never interrupts an interaction.
        if event.end_time <= event.start_time {
            return None;
        }
        Some(Self {
            kind,
            event_id: Some(event.event_id.clone()),
            press: at,
            origin_start: event.start_time,
            origin_end: event.end_time,
            origin_day_index: event.day_index,
            origin_day_span: event.day_span.max(1),
            multi_day: event.multi_day,
            last_minutes: 0,
            last_days: 0,
            peak_minutes: 0,
            peak_days: 0,
        })
    }

    fn for_placeholder(kind: DragKind, placeholder: &Placeholder, at: PointerSample) -> Self {
        Self {
            kind,
            event_id: None,
            press: at,
            origin_start: placeholder.start_time,
            origin_end: placeholder.end_time,
            origin_day_index: placeholder.start_day_index,
            origin_day_span: placeholder.day_span.max(1),
            multi_day: placeholder.day_span > 1,
            last_minutes: 0,
            last_days: 0,
            peak_minutes: 0,
            peak_days: 0,
        }
    }

    /// Release-jitter fallback: if the instantaneous delta decayed back to
    /// zero but a non-zero extreme was reached, commit the extreme.
    fn settle_peaks(&mut self) {
        if self.last_minutes == 0 && self.peak_minutes != 0 {
            self.last_minutes = self.peak_minutes;
        }
        if self.last_days == 0 && self.peak_days != 0 {
            self.last_days = self.peak_days;
        }
    }
}

/// Bounds of the calendar day containing `anchor`.
fn day_bounds(anchor: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = anchor.date_naive();
    let start = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
    (start, start + Duration::days(1))
}

/// Clamp a range into the calendar day of `anchor`, preserving as much of
/// the range as fits.
fn clamp_to_day(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    anchor: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let (day_start, day_end) = day_bounds(anchor);
    (start.max(day_start), end.min(day_end))
}
