//! Gesture-scoped undo batching.
//!
//! A drag, a resize, or a text editing session produces a stream of
//! per-frame or per-keystroke commits. [`HistoryBatcher`] brackets such
//! a gesture with the document's pause/resume history calls so the
//! whole stream collapses into one undo step.
//!
//! Text gestures carry a grace window: when editing starts within
//! [`TEXT_GRACE`] of the element's creation, history is left running,
//! so undoing steps back through the element's birth instead of
//! swallowing the whole first editing session into one opaque step.

use std::time::Duration;

use crate::crdt::DeckDocument;
use crate::element::timestamp_ms;

/// Grace period after element creation during which a text gesture does
/// not pause history.
pub const TEXT_GRACE: Duration = Duration::from_millis(100);

/// Kind of gesture currently being batched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Drag or resize; always batched.
    Pointer,
    /// Text editing; batched unless it starts inside the grace window.
    Text,
}

#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    kind: GestureKind,
    paused: bool,
}

/// Brackets interaction gestures with history pause/resume.
///
/// At most one gesture is active at a time; beginning a new gesture
/// releases the previous one first. Ending with no gesture active is a
/// no-op, so blur and escape handlers can call it unconditionally.
#[derive(Debug)]
pub struct HistoryBatcher {
    active: Option<ActiveGesture>,
    grace: Duration,
}

impl HistoryBatcher {
    pub fn new() -> Self {
        Self { active: None, grace: TEXT_GRACE }
    }

    /// Override the text grace window.
    pub fn with_grace(grace: Duration) -> Self {
        Self { active: None, grace }
    }

    /// Begin a drag or resize gesture.
    pub fn begin_pointer_gesture(&mut self, doc: &mut DeckDocument) {
        self.end_gesture(doc);
        doc.pause_history();
        self.active = Some(ActiveGesture { kind: GestureKind::Pointer, paused: true });
    }

    /// Begin a text editing gesture on an element created at
    /// `created_at_ms` (epoch milliseconds).
    pub fn begin_text_gesture(&mut self, doc: &mut DeckDocument, created_at_ms: i64) {
        self.begin_text_gesture_at(doc, created_at_ms, timestamp_ms());
    }

    /// Deterministic variant of [`begin_text_gesture`] taking the
    /// current time explicitly.
    ///
    /// [`begin_text_gesture`]: HistoryBatcher::begin_text_gesture
    pub fn begin_text_gesture_at(
        &mut self,
        doc: &mut DeckDocument,
        created_at_ms: i64,
        now_ms: i64,
    ) {
        self.end_gesture(doc);
        let age_ms = now_ms.saturating_sub(created_at_ms);
        let paused = age_ms < 0 || age_ms as u128 > self.grace.as_millis();
        if paused {
            doc.pause_history();
        }
        self.active = Some(ActiveGesture { kind: GestureKind::Text, paused });
    }

    /// End the active gesture, resuming history if it was paused.
    pub fn end_gesture(&mut self, doc: &mut DeckDocument) {
        if let Some(gesture) = self.active.take() {
            if gesture.paused {
                doc.resume_history();
            }
        }
    }

    /// Kind of the gesture in flight, if any.
    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.active.map(|g| g.kind)
    }
}

impl Default for HistoryBatcher {
    fn default() -> Self {
        Self::new()
    }
}
