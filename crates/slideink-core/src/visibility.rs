//! Tracks which slide dominates the viewport during scrolling.
//!
//! The rendering layer reports per-slide intersection ratios; the
//! tracker picks the most visible slide above a threshold. Programmatic
//! scrolls (clicking a slide in the filmstrip) suppress observation for
//! a short window so the fly-by slides do not steal the active slot.

use std::collections::HashMap;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Minimum intersection ratio for a slide to count as visible.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// How long observations are dropped after a programmatic scroll.
pub const SUPPRESS_WINDOW: Duration = Duration::from_millis(1_500);

/// Viewport visibility state for the slides of a deck.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    /// Latest reported intersection ratio per slide index.
    ratios: HashMap<usize, f64>,
    threshold: f64,
    suppress_window: Duration,
    suppressed_at: Option<Instant>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self {
            ratios: HashMap::new(),
            threshold: VISIBILITY_THRESHOLD,
            suppress_window: SUPPRESS_WINDOW,
            suppressed_at: None,
        }
    }

    /// Override the visibility threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the suppression window.
    pub fn with_suppress_window(mut self, window: Duration) -> Self {
        self.suppress_window = window;
        self
    }

    /// Report an intersection observation for a slide.
    ///
    /// A slide that stopped intersecting is removed from the table.
    /// Observations arriving while suppressed are dropped.
    pub fn observe(&mut self, slide_index: usize, ratio: f64, intersecting: bool) {
        if self.is_suppressed() {
            return;
        }
        if intersecting {
            self.ratios.insert(slide_index, ratio);
        } else {
            self.ratios.remove(&slide_index);
        }
    }

    /// Slide with the highest ratio at or above the threshold, ties
    /// going to the lowest index. `None` when nothing qualifies.
    pub fn most_visible(&self) -> Option<usize> {
        self.ratios
            .iter()
            .filter(|(_, ratio)| **ratio >= self.threshold)
            .max_by(|(ia, ra), (ib, rb)| {
                // Higher ratio wins; on a tie the lower index does.
                ra.partial_cmp(rb)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ib.cmp(ia))
            })
            .map(|(index, _)| *index)
    }

    /// Begin a suppression window (a programmatic scroll just started).
    /// Calling again restarts the window.
    pub fn suppress(&mut self) {
        self.suppressed_at = Some(Instant::now());
    }

    /// End suppression immediately.
    pub fn resume(&mut self) {
        self.suppressed_at = None;
    }

    /// Whether observations are currently being dropped. The window
    /// expires on its own; an explicit [`resume`](VisibilityTracker::resume)
    /// is not required.
    pub fn is_suppressed(&mut self) -> bool {
        match self.suppressed_at {
            Some(at) if at.elapsed() < self.suppress_window => true,
            Some(_) => {
                self.suppressed_at = None;
                false
            }
            None => false,
        }
    }

    /// Forget a slide's observation (it was deleted).
    pub fn forget(&mut self, slide_index: usize) {
        self.ratios.remove(&slide_index);
    }

    /// Drop all observations (the deck was reloaded).
    pub fn clear(&mut self) {
        self.ratios.clear();
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new()
    }
}
