//! Pure coordinate math for drag and resize operations.
//!
//! Nothing here touches the document; callers apply the returned
//! transforms through the mutation coordinator.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use crate::element::Transform;

/// Minimum element width in canvas units.
pub const MIN_ELEMENT_WIDTH: f64 = 50.0;
/// Minimum element height in canvas units.
pub const MIN_ELEMENT_HEIGHT: f64 = 30.0;

/// Inner padding of the slide container.
pub const CANVAS_PADDING: f64 = 32.0;
/// Rendered slide container size in canvas units.
pub const SLIDE_WIDTH: f64 = 1368.0;
pub const SLIDE_HEIGHT: f64 = 768.0;

/// The padded interior of a slide container that elements may occupy.
///
/// Recomputed per interaction from the rendered container; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Derive bounds from a rendered container size, subtracting padding
    /// on both sides.
    pub fn from_container(width: f64, height: f64) -> Self {
        Self {
            width: (width - CANVAS_PADDING * 2.0).max(0.0),
            height: (height - CANVAS_PADDING * 2.0).max(0.0),
        }
    }
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self::from_container(SLIDE_WIDTH, SLIDE_HEIGHT)
    }
}

/// Edge being dragged during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Apply a drag delta, clamping the result inside the canvas.
///
/// A zero delta returns the transform unchanged, bit for bit.
pub fn clamp_drag(transform: &Transform, delta: Vec2, bounds: CanvasBounds) -> Transform {
    if delta.x == 0.0 && delta.y == 0.0 {
        return *transform;
    }

    let x = (transform.x + delta.x).clamp(0.0, (bounds.width - transform.width).max(0.0));
    let y = (transform.y + delta.y).clamp(0.0, (bounds.height - transform.height).max(0.0));

    Transform { x, y, ..*transform }
}

/// Resize from one edge, keeping the opposite edge fixed.
///
/// Width floors at [`MIN_ELEMENT_WIDTH`] and height at
/// [`MIN_ELEMENT_HEIGHT`]. The position of a top/left resize is derived
/// from the floored extent, so the fixed edge never moves once the floor
/// is hit.
pub fn resize(transform: &Transform, delta: Vec2, edge: ResizeEdge) -> Transform {
    let mut out = *transform;
    match edge {
        ResizeEdge::Right => {
            out.width = (transform.width + delta.x).max(MIN_ELEMENT_WIDTH);
        }
        ResizeEdge::Left => {
            out.width = (transform.width + delta.x).max(MIN_ELEMENT_WIDTH);
            // Right edge stays at x + width.
            out.x = transform.x + (transform.width - out.width);
        }
        ResizeEdge::Bottom => {
            out.height = (transform.height + delta.y).max(MIN_ELEMENT_HEIGHT);
        }
        ResizeEdge::Top => {
            out.height = (transform.height + delta.y).max(MIN_ELEMENT_HEIGHT);
            // Bottom edge stays at y + height.
            out.y = transform.y + (transform.height - out.height);
        }
    }
    out
}

/// Clamp a transform back inside the canvas after a resize grew it past
/// an edge. Position is pulled in first, then size is capped to fit.
pub fn clamp_to_bounds(transform: &Transform, bounds: CanvasBounds) -> Transform {
    let width = transform.width.min(bounds.width).max(MIN_ELEMENT_WIDTH.min(bounds.width));
    let height = transform.height.min(bounds.height).max(MIN_ELEMENT_HEIGHT.min(bounds.height));
    let x = transform.x.clamp(0.0, (bounds.width - width).max(0.0));
    let y = transform.y.clamp(0.0, (bounds.height - height).max(0.0));
    Transform { x, y, width, height, ..*transform }
}
