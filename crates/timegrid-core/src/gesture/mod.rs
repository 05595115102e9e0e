//! Gesture-driven time editing.
//!
//! Converts a continuous pointer/touch trajectory into a proposed time
//! range. One explicit state machine per interactive surface -- a single
//! [`GestureEditor::apply`] transition function consumes
//! [`GestureInput`] samples and emits [`EditorEvent`]s; there are no
//! per-handle recognizers or shared guard flags, so concurrent gestures on
//! one surface are unrepresentable.

pub mod editor;
pub mod grid;

#[cfg(test)]
mod editor_tests;

pub use editor::{
    DragContext, DragKind, EditorEvent, EditorState, EventRef, GestureEditor, GestureInput,
    Placeholder, PointerSample, PressTarget, ProposedEdit, ResizeHandle,
};
pub use grid::GridMetrics;
