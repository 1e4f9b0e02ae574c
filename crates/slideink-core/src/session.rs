//! Per-user editor session state.
//!
//! Everything here is local to one user and never replicated: which
//! slide they are looking at and which element they believe holds
//! focus. The persisted element `mode` field remains authoritative; the
//! session pointer is a cache the coordinator keeps consistent with it.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// Local view state for one user of a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSession {
    /// Index of the slide the user is working on.
    pub active_slide: usize,
    /// Element this user last gave focus, if any.
    pub active_element: Option<ElementId>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the session at a slide.
    pub fn set_active_slide(&mut self, index: usize) {
        self.active_slide = index;
    }

    /// Record the focused element.
    pub fn focus(&mut self, id: ElementId) {
        self.active_element = Some(id);
    }

    /// Drop the focused element if it matches `id`.
    pub fn unfocus(&mut self, id: &ElementId) {
        if self.active_element.as_ref() == Some(id) {
            self.active_element = None;
        }
    }

    /// Drop any focused element.
    pub fn clear_focus(&mut self) {
        self.active_element = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_focus_tracking() {
        let mut session = EditorSession::new();
        assert_eq!(session.active_element, None);

        let id = Uuid::new_v4();
        session.focus(id);
        assert_eq!(session.active_element, Some(id));

        // Unfocusing a different element leaves the pointer alone.
        session.unfocus(&Uuid::new_v4());
        assert_eq!(session.active_element, Some(id));

        session.unfocus(&id);
        assert_eq!(session.active_element, None);
    }
}
