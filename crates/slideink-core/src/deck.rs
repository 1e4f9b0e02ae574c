//! Slide deck model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{ElementId, TextElement};

/// Unique identifier for a slide.
pub type SlideId = Uuid;

/// Number of slides a fresh deck is initialized with.
pub const INITIAL_SLIDE_COUNT: usize = 4;

/// An ordered page of text elements.
///
/// The slide id is assigned at creation and never changes; it is the
/// stable render key independent of the slide's position in the deck.
/// Slide number = position + 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub elements: Vec<TextElement>,
}

impl Slide {
    /// Create a new empty slide.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(), elements: Vec::new() }
    }

    /// Find an element by id.
    pub fn element(&self, id: &ElementId) -> Option<&TextElement> {
        self.elements.iter().find(|el| el.id == *id)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

/// Count elements whose mode is Selected or Editing across the deck.
///
/// The deck-wide exclusivity invariant requires this to be at most 1 at
/// every committed point.
pub fn active_element_count(slides: &[Slide]) -> usize {
    slides
        .iter()
        .flat_map(|s| s.elements.iter())
        .filter(|el| el.mode.is_active())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementMode;

    #[test]
    fn test_slide_element_lookup() {
        let mut slide = Slide::new();
        let el = TextElement::new();
        let id = el.id;
        slide.elements.push(el);

        assert_eq!(slide.len(), 1);
        assert!(slide.element(&id).is_some());
        assert!(slide.element(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_active_element_count() {
        let mut a = Slide::new();
        let mut b = Slide::new();
        let mut idle = TextElement::new();
        idle.mode = ElementMode::Idle;
        a.elements.push(idle);
        b.elements.push(TextElement::new()); // Selected

        let slides = vec![a, b];
        assert_eq!(active_element_count(&slides), 1);
    }
}
