//! Element interaction state machine and click disambiguation.
//!
//! Mode transitions are pure; the deck-wide "at most one selected or
//! editing element" rule is enforced at the mutation layer, not here.

use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use crate::element::{ElementId, ElementMode};

/// Window in which a second click upgrades a single click to a double click.
pub const CLICK_WINDOW: Duration = Duration::from_millis(200);

/// An interaction intent delivered by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// A committed single click on the element.
    SingleClick,
    /// A double click on the element.
    DoubleClick,
    /// The element's editor lost focus.
    Blur,
    /// Escape pressed while the element had focus.
    Escape,
    /// A click landed outside the element's bounds.
    ClickOutside,
}

/// Compute the next mode for an element, or `None` when the event does
/// not cause a transition.
///
/// Escape and blur leave editing without discarding anything: content is
/// persisted per keystroke, so there is nothing uncommitted to drop.
pub fn transition(mode: ElementMode, event: InteractionEvent) -> Option<ElementMode> {
    use ElementMode::*;
    use InteractionEvent::*;

    match (mode, event) {
        (Idle, SingleClick) => Some(Selected),
        (Selected, SingleClick) => Some(Editing),
        (Editing, SingleClick) => None,
        (Idle, DoubleClick) | (Selected, DoubleClick) => Some(Editing),
        (Editing, DoubleClick) => None,
        (Editing, Blur) | (Editing, Escape) => Some(Idle),
        (Selected, ClickOutside) | (Editing, ClickOutside) => Some(Idle),
        _ => None,
    }
}

/// Outcome of a resolved click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResolution {
    Single(ElementId),
    Double(ElementId),
}

/// Distinguishes single clicks from double clicks on elements.
///
/// A click is held pending until either a second click on the same
/// element arrives inside the window (resolving to a double click and
/// suppressing the pending single click), or the window elapses and
/// [`ClickArbiter::poll`] commits the single click.
#[derive(Debug, Clone)]
pub struct ClickArbiter {
    pending: Option<(ElementId, Instant)>,
    window: Duration,
}

impl ClickArbiter {
    pub fn new() -> Self {
        Self { pending: None, window: CLICK_WINDOW }
    }

    /// Override the disambiguation window (the default is not load-bearing).
    pub fn with_window(window: Duration) -> Self {
        Self { pending: None, window }
    }

    /// Register a click on an element.
    ///
    /// Returns `Double` immediately when this click lands inside the
    /// window of a pending click on the same element; otherwise the click
    /// becomes pending. A pending click on a *different* element is
    /// committed as a single click first.
    pub fn click(&mut self, id: ElementId) -> Option<ClickResolution> {
        let now = Instant::now();
        match self.pending.take() {
            Some((pending_id, at)) if pending_id == id && now.duration_since(at) < self.window => {
                Some(ClickResolution::Double(id))
            }
            Some((pending_id, _)) if pending_id != id => {
                self.pending = Some((id, now));
                Some(ClickResolution::Single(pending_id))
            }
            _ => {
                // Same element but expired, or nothing pending.
                self.pending = Some((id, now));
                None
            }
        }
    }

    /// Commit the pending single click once its window has elapsed.
    ///
    /// Call once per frame (or on a timer); returns `None` while the
    /// window is still open.
    pub fn poll(&mut self) -> Option<ClickResolution> {
        let now = Instant::now();
        match self.pending {
            Some((id, at)) if now.duration_since(at) >= self.window => {
                self.pending = None;
                Some(ClickResolution::Single(id))
            }
            _ => None,
        }
    }

    /// Drop any pending click (e.g. when the pointer started a drag).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a click is awaiting disambiguation.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ClickArbiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_click_protocol_transitions() {
        use ElementMode::*;
        use InteractionEvent::*;

        assert_eq!(transition(Idle, SingleClick), Some(Selected));
        assert_eq!(transition(Selected, SingleClick), Some(Editing));
        assert_eq!(transition(Idle, DoubleClick), Some(Editing));
        assert_eq!(transition(Selected, DoubleClick), Some(Editing));
        assert_eq!(transition(Editing, SingleClick), None);
        assert_eq!(transition(Editing, Blur), Some(Idle));
        assert_eq!(transition(Editing, Escape), Some(Idle));
        assert_eq!(transition(Selected, ClickOutside), Some(Idle));
        assert_eq!(transition(Editing, ClickOutside), Some(Idle));
        assert_eq!(transition(Idle, ClickOutside), None);
        assert_eq!(transition(Idle, Blur), None);
    }

    #[test]
    fn test_double_click_suppresses_single() {
        let mut arbiter = ClickArbiter::new();
        let id = Uuid::new_v4();

        assert_eq!(arbiter.click(id), None);
        // Second click well within the window.
        assert_eq!(arbiter.click(id), Some(ClickResolution::Double(id)));
        // The pending single click was consumed.
        assert!(!arbiter.has_pending());
        assert_eq!(arbiter.poll(), None);
    }

    #[test]
    fn test_single_click_commits_after_window() {
        let mut arbiter = ClickArbiter::with_window(Duration::from_millis(1));
        let id = Uuid::new_v4();

        assert_eq!(arbiter.click(id), None);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(arbiter.poll(), Some(ClickResolution::Single(id)));
        assert_eq!(arbiter.poll(), None);
    }

    #[test]
    fn test_click_on_other_element_flushes_pending() {
        let mut arbiter = ClickArbiter::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(arbiter.click(a), None);
        assert_eq!(arbiter.click(b), Some(ClickResolution::Single(a)));
        assert!(arbiter.has_pending());
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut arbiter = ClickArbiter::new();
        arbiter.click(Uuid::new_v4());
        arbiter.cancel();
        assert!(!arbiter.has_pending());
    }

    #[test]
    fn test_expired_pending_does_not_double() {
        let mut arbiter = ClickArbiter::with_window(Duration::from_millis(1));
        let id = Uuid::new_v4();

        assert_eq!(arbiter.click(id), None);
        std::thread::sleep(Duration::from_millis(5));
        // Window elapsed: this is a fresh first click, not a double.
        assert_eq!(arbiter.click(id), None);
    }
}
