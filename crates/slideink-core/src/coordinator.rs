//! Mutation coordinator: the single write path for deck edits.
//!
//! Every edit flows through [`SlideCoordinator`], which owns the shared
//! [`DeckDocument`] and this user's [`EditorSession`]. The coordinator
//! enforces deck-level policy (exclusive focus, the last slide never
//! being deleted, no geometry edits while editing text) and keeps the
//! session pointer consistent with the persisted element modes.
//!
//! Operations on a missing target are silent no-ops; operations on an
//! uninitialized deck panic, since that is a wiring bug rather than a
//! race with a remote peer.

use kurbo::Vec2;
use loro::LoroResult;

use crate::crdt::{DeckDocument, SnapshotError};
use crate::deck::{Slide, SlideId};
use crate::element::{ElementId, ElementMode, ElementUpdate, TextElement};
use crate::geometry::{self, CanvasBounds, ResizeEdge};
use crate::interaction::{transition, InteractionEvent};
use crate::session::EditorSession;

pub struct SlideCoordinator {
    doc: DeckDocument,
    session: EditorSession,
    bounds: CanvasBounds,
}

impl SlideCoordinator {
    /// Create a coordinator over a freshly initialized deck.
    pub fn new() -> LoroResult<Self> {
        let mut doc = DeckDocument::new();
        doc.init_default()?;
        Ok(Self::from_document(doc))
    }

    /// Load a coordinator from a deck snapshot.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(Self::from_document(DeckDocument::from_snapshot(bytes)?))
    }

    /// Wrap an existing document. The document must already be
    /// initialized before any mutation is attempted.
    pub fn from_document(doc: DeckDocument) -> Self {
        let session = EditorSession::new();
        Self { doc, session, bounds: CanvasBounds::default() }
    }

    fn assert_initialized(&self) {
        assert!(self.doc.is_initialized(), "deck document is not initialized");
    }

    fn log_write<T: Default>(result: LoroResult<T>) -> T {
        match result {
            Ok(v) => v,
            Err(err) => {
                log::error!("deck write failed: {err}");
                T::default()
            }
        }
    }

    // --- Accessors ---

    pub fn document(&self) -> &DeckDocument {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut DeckDocument {
        &mut self.doc
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn slides(&self) -> Vec<Slide> {
        self.doc.slides()
    }

    pub fn slide_count(&self) -> usize {
        self.doc.slide_count()
    }

    pub fn active_slide(&self) -> usize {
        self.session.active_slide
    }

    /// Point the session at a slide. Out-of-range indices are ignored.
    pub fn set_active_slide(&mut self, index: usize) {
        if index < self.doc.slide_count() {
            self.session.set_active_slide(index);
        }
    }

    /// Update the canvas interior used to clamp drags and resizes.
    pub fn set_canvas_bounds(&mut self, bounds: CanvasBounds) {
        self.bounds = bounds;
    }

    /// Find the slide holding an element.
    pub fn find_element(&self, id: &ElementId) -> Option<usize> {
        self.doc
            .slides()
            .iter()
            .position(|slide| slide.element(id).is_some())
    }

    // --- Slide operations ---

    /// Append a new slide to the deck.
    pub fn add_slide(&mut self) -> SlideId {
        self.assert_initialized();
        Self::log_write(self.doc.add_slide().map(Some)).unwrap_or_else(SlideId::new_v4)
    }

    /// Delete the slide at `index`.
    ///
    /// The last remaining slide is never deleted. When the active slide
    /// shifts or disappears, the session index is adjusted so it stays
    /// in range and keeps pointing at the same slide where possible.
    pub fn delete_slide(&mut self, index: usize) -> bool {
        self.assert_initialized();
        let count = self.doc.slide_count();
        if count <= 1 || index >= count {
            return false;
        }

        // Focus living on the doomed slide does not survive it.
        if let Some(id) = self.session.active_element {
            if self.doc.slide(index).map(|s| s.element(&id).is_some()).unwrap_or(false) {
                self.session.clear_focus();
            }
        }

        if !Self::log_write(self.doc.remove_slide(index)) {
            return false;
        }

        let new_count = count - 1;
        let active = self.session.active_slide;
        if active >= new_count {
            self.session.set_active_slide(new_count - 1);
        } else if active > index {
            self.session.set_active_slide(active - 1);
        }
        true
    }

    // --- Element operations ---

    /// Create a text element on the active slide. The new element takes
    /// focus; any previously selected or editing element is demoted in
    /// the same transaction.
    pub fn add_text_element(&mut self) -> ElementId {
        self.assert_initialized();
        let element = TextElement::new();
        let id = element.id;
        if Self::log_write(self.doc.add_element(self.session.active_slide, &element)) {
            self.session.focus(id);
        }
        id
    }

    /// Delete an element wherever it lives in the deck. Missing targets
    /// are a silent no-op.
    pub fn delete_element(&mut self, id: &ElementId) -> bool {
        self.assert_initialized();
        let Some(slide_index) = self.find_element(id) else {
            return false;
        };
        let removed = Self::log_write(self.doc.remove_element(slide_index, id));
        if removed {
            self.session.unfocus(id);
        }
        removed
    }

    /// Give an element the deck-wide focus ring.
    pub fn select_element(&mut self, id: &ElementId) -> bool {
        self.set_element_mode(id, ElementMode::Selected)
    }

    /// Put an element into text editing.
    pub fn edit_element(&mut self, id: &ElementId) -> bool {
        self.set_element_mode(id, ElementMode::Editing)
    }

    /// Set an element's mode directly. Active modes demote every other
    /// element atomically; `Idle` releases the session focus.
    pub fn set_element_mode(&mut self, id: &ElementId, mode: ElementMode) -> bool {
        self.assert_initialized();
        let Some(slide_index) = self.find_element(id) else {
            return false;
        };
        let applied = Self::log_write(self.doc.set_element_mode(slide_index, id, mode));
        if applied {
            if mode.is_active() {
                self.session.focus(*id);
            } else {
                self.session.unfocus(id);
            }
        }
        applied
    }

    /// Feed an interaction event to an element, applying the resulting
    /// mode transition if any. Returns the new mode when one was applied.
    pub fn apply_event(&mut self, id: &ElementId, event: InteractionEvent) -> Option<ElementMode> {
        self.assert_initialized();
        let slide_index = self.find_element(id)?;
        let current = self.doc.get_element(slide_index, id)?.mode;
        let next = transition(current, event)?;
        self.set_element_mode(id, next).then_some(next)
    }

    /// Demote whichever element currently holds focus (a click on empty
    /// canvas).
    pub fn clear_selection(&mut self) {
        self.assert_initialized();
        if let Some((_, id)) = self.doc.active_element() {
            self.set_element_mode(&id, ElementMode::Idle);
        }
        self.session.clear_focus();
    }

    /// Merge a partial update into an element. Missing targets are a
    /// silent no-op.
    pub fn update_element(&mut self, id: &ElementId, update: &ElementUpdate) -> bool {
        self.assert_initialized();
        let Some(slide_index) = self.find_element(id) else {
            return false;
        };
        Self::log_write(self.doc.update_element(slide_index, id, update))
    }

    /// Move an element by a pointer delta, clamped to the canvas.
    /// Elements being text-edited do not move.
    pub fn drag_element(&mut self, id: &ElementId, delta: Vec2) -> bool {
        self.assert_initialized();
        let Some(slide_index) = self.find_element(id) else {
            return false;
        };
        let Some(element) = self.doc.get_element(slide_index, id) else {
            return false;
        };
        if element.mode.is_editing() {
            return false;
        }
        if delta.x == 0.0 && delta.y == 0.0 {
            return true;
        }
        let moved = geometry::clamp_drag(&element.transform, delta, self.bounds);
        Self::log_write(self.doc.update_element(
            slide_index,
            id,
            &ElementUpdate::transform(moved),
        ))
    }

    /// Resize an element from one edge, clamped to the canvas. Elements
    /// being text-edited do not resize.
    pub fn resize_element(&mut self, id: &ElementId, delta: Vec2, edge: ResizeEdge) -> bool {
        self.assert_initialized();
        let Some(slide_index) = self.find_element(id) else {
            return false;
        };
        let Some(element) = self.doc.get_element(slide_index, id) else {
            return false;
        };
        if element.mode.is_editing() {
            return false;
        }
        let resized = geometry::resize(&element.transform, delta, edge);
        let resized = geometry::clamp_to_bounds(&resized, self.bounds);
        Self::log_write(self.doc.update_element(
            slide_index,
            id,
            &ElementUpdate::transform(resized),
        ))
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.doc.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.doc.redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{active_element_count, INITIAL_SLIDE_COUNT};
    use crate::geometry::{MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH};

    fn coordinator() -> SlideCoordinator {
        SlideCoordinator::new().unwrap()
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn test_mutation_on_uninitialized_deck_panics() {
        let mut c = SlideCoordinator::from_document(DeckDocument::new());
        c.add_text_element();
    }

    #[test]
    fn test_last_slide_is_never_deleted() {
        let mut c = coordinator();
        for _ in 0..INITIAL_SLIDE_COUNT - 1 {
            assert!(c.delete_slide(0));
        }
        assert_eq!(c.slide_count(), 1);
        assert!(!c.delete_slide(0));
        assert_eq!(c.slide_count(), 1);
    }

    #[test]
    fn test_delete_slide_adjusts_active_index() {
        let mut c = coordinator();

        // Deleting a slide before the active one shifts the index down.
        c.set_active_slide(2);
        assert!(c.delete_slide(0));
        assert_eq!(c.active_slide(), 1);

        // Deleting the last slide while it is active clamps the index.
        let last = c.slide_count() - 1;
        c.set_active_slide(last);
        assert!(c.delete_slide(last));
        assert_eq!(c.active_slide(), c.slide_count() - 1);
    }

    #[test]
    fn test_delete_slide_after_active_keeps_index() {
        let mut c = coordinator();
        c.set_active_slide(1);
        assert!(c.delete_slide(3));
        assert_eq!(c.active_slide(), 1);
    }

    #[test]
    fn test_exclusive_focus_across_slides() {
        let mut c = coordinator();
        let first = c.add_text_element();
        c.set_active_slide(2);
        let second = c.add_text_element();

        let slides = c.slides();
        assert_eq!(active_element_count(&slides), 1);
        assert_eq!(slides[0].element(&first).unwrap().mode, ElementMode::Idle);
        assert_eq!(slides[2].element(&second).unwrap().mode, ElementMode::Selected);
        assert_eq!(c.session().active_element, Some(second));
    }

    #[test]
    fn test_interaction_events_drive_modes() {
        let mut c = coordinator();
        let id = c.add_text_element();
        // New elements start selected, so a single click enters editing.
        assert_eq!(c.apply_event(&id, InteractionEvent::SingleClick), Some(ElementMode::Editing));
        assert_eq!(c.apply_event(&id, InteractionEvent::SingleClick), None);
        assert_eq!(c.apply_event(&id, InteractionEvent::Escape), Some(ElementMode::Idle));
        assert_eq!(c.session().active_element, None);
    }

    #[test]
    fn test_clear_selection_demotes_focus() {
        let mut c = coordinator();
        let id = c.add_text_element();
        c.clear_selection();
        let slides = c.slides();
        assert_eq!(slides[0].element(&id).unwrap().mode, ElementMode::Idle);
        assert_eq!(active_element_count(&slides), 0);
        assert_eq!(c.session().active_element, None);
    }

    #[test]
    fn test_missing_targets_are_silent_noops() {
        let mut c = coordinator();
        let ghost = ElementId::new_v4();
        assert!(!c.delete_element(&ghost));
        assert!(!c.select_element(&ghost));
        assert!(!c.update_element(&ghost, &ElementUpdate::content("x")));
        assert!(!c.drag_element(&ghost, Vec2::new(1.0, 1.0)));
        assert_eq!(c.apply_event(&ghost, InteractionEvent::SingleClick), None);
    }

    #[test]
    fn test_drag_moves_and_respects_editing() {
        let mut c = coordinator();
        let id = c.add_text_element();
        let before = c.slides()[0].element(&id).unwrap().transform;

        assert!(c.drag_element(&id, Vec2::new(25.0, -10.0)));
        let after = c.slides()[0].element(&id).unwrap().transform;
        assert!((after.x - (before.x + 25.0)).abs() < f64::EPSILON);
        assert!((after.y - (before.y - 10.0)).abs() < f64::EPSILON);

        // No geometry edits while the element is being text-edited.
        c.edit_element(&id);
        assert!(!c.drag_element(&id, Vec2::new(5.0, 5.0)));
        let unchanged = c.slides()[0].element(&id).unwrap().transform;
        assert_eq!(unchanged, after);
    }

    #[test]
    fn test_resize_floors_at_minimum() {
        let mut c = coordinator();
        let id = c.add_text_element();
        assert!(c.resize_element(&id, Vec2::new(-10_000.0, 0.0), ResizeEdge::Left));
        assert!(c.resize_element(&id, Vec2::new(0.0, -10_000.0), ResizeEdge::Top));

        let t = c.slides()[0].element(&id).unwrap().transform;
        assert!((t.width - MIN_ELEMENT_WIDTH).abs() < f64::EPSILON);
        assert!((t.height - MIN_ELEMENT_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_element_releases_focus() {
        let mut c = coordinator();
        let id = c.add_text_element();
        assert!(c.delete_element(&id));
        assert_eq!(c.session().active_element, None);
        assert!(c.slides()[0].is_empty());
    }

    #[test]
    fn test_undo_restores_deleted_element() {
        let mut c = coordinator();
        let id = c.add_text_element();
        c.delete_element(&id);
        assert!(c.slides()[0].is_empty());

        assert!(c.undo());
        assert_eq!(c.slides()[0].len(), 1);
    }
}
