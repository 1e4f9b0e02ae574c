//! Input state management for mouse/touch/keyboard events.
//!
//! Click semantics (single vs double) live in
//! [`ClickArbiter`](crate::interaction::ClickArbiter); this module only
//! decides whether a press turned into a drag or stayed a click.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// The platform undo/redo chord modifier (ctrl, or cmd on macOS and
    /// in browsers on macOS).
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: Vec2 },
}

/// Keyboard event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Distance in canvas units the pointer must travel before a press
/// becomes a drag. Below this, releasing counts as a click.
pub const DRAG_ACTIVATION_DISTANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    /// Pressed but not yet moved past the activation distance.
    Armed { start: Point },
    /// A real drag.
    Active { start: Point },
}

/// Tracks the current input state across frames.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position in canvas coordinates.
    pub pointer_position: Point,
    /// Previous pointer position for delta calculations.
    pub previous_pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    just_pressed_buttons: HashSet<MouseButton>,
    just_released_buttons: HashSet<MouseButton>,
    /// Current modifier keys state.
    pub modifiers: Modifiers,
    /// Accumulated scroll delta since last frame.
    pub scroll_delta: Vec2,
    pressed_keys: HashSet<String>,
    just_pressed_keys: HashSet<String>,
    drag: DragState,
    drag_just_started: bool,
    /// Position of a press that was released without dragging.
    click_released: Option<Point>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer_position: Point::ZERO,
            previous_pointer_position: Point::ZERO,
            pressed_buttons: HashSet::new(),
            just_pressed_buttons: HashSet::new(),
            just_released_buttons: HashSet::new(),
            modifiers: Modifiers::default(),
            scroll_delta: Vec2::ZERO,
            pressed_keys: HashSet::new(),
            just_pressed_keys: HashSet::new(),
            drag: DragState::Idle,
            drag_just_started: false,
            click_released: None,
        }
    }
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.just_pressed_buttons.clear();
        self.just_released_buttons.clear();
        self.just_pressed_keys.clear();
        self.scroll_delta = Vec2::ZERO;
        self.previous_pointer_position = self.pointer_position;
        self.drag_just_started = false;
        self.click_released = None;
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                if self.pressed_buttons.insert(button) {
                    self.just_pressed_buttons.insert(button);
                }
                if button == MouseButton::Left && self.drag == DragState::Idle {
                    self.drag = DragState::Armed { start: position };
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                if self.pressed_buttons.remove(&button) {
                    self.just_released_buttons.insert(button);
                }
                if button == MouseButton::Left {
                    if let DragState::Armed { .. } = self.drag {
                        self.click_released = Some(position);
                    }
                    self.drag = DragState::Idle;
                }
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
                if let DragState::Armed { start } = self.drag {
                    if (position - start).hypot() >= DRAG_ACTIVATION_DISTANCE {
                        self.drag = DragState::Active { start };
                        self.drag_just_started = true;
                    }
                }
            }
            PointerEvent::Scroll { position, delta } => {
                self.pointer_position = position;
                self.scroll_delta += delta;
            }
        }
    }

    /// Process a key event.
    pub fn handle_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                if self.pressed_keys.insert(key.clone()) {
                    self.just_pressed_keys.insert(key);
                }
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    /// Update modifier keys state.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Check if a button is currently pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Check if a button was just pressed this frame.
    pub fn is_button_just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed_buttons.contains(&button)
    }

    /// Check if a button was just released this frame.
    pub fn is_button_just_released(&self, button: MouseButton) -> bool {
        self.just_released_buttons.contains(&button)
    }

    /// Check if a key is currently pressed.
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Check if a key was just pressed this frame.
    pub fn is_key_just_pressed(&self, key: &str) -> bool {
        self.just_pressed_keys.contains(key)
    }

    /// Whether the pointer is past the activation distance and dragging.
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Active { .. })
    }

    /// Whether the drag crossed the activation distance this frame.
    pub fn drag_just_started(&self) -> bool {
        self.drag_just_started
    }

    /// Position of a press released without dragging this frame, if any.
    /// Feed this to the click arbiter.
    pub fn click_released(&self) -> Option<Point> {
        self.click_released
    }

    /// Get the pointer movement delta since last frame.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    /// Get the drag delta from the press position, if dragging.
    pub fn drag_delta(&self) -> Option<Vec2> {
        match self.drag {
            DragState::Active { start } => Some(self.pointer_position - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputState, x: f64, y: f64) {
        input.handle_pointer_event(PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        });
    }

    fn release(input: &mut InputState, x: f64, y: f64) {
        input.handle_pointer_event(PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        });
    }

    fn move_to(input: &mut InputState, x: f64, y: f64) {
        input.handle_pointer_event(PointerEvent::Move { position: Point::new(x, y) });
    }

    #[test]
    fn test_button_press_and_release() {
        let mut input = InputState::new();
        press(&mut input, 100.0, 100.0);
        assert!(input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_pressed(MouseButton::Left));

        release(&mut input, 100.0, 100.0);
        assert!(!input.is_button_pressed(MouseButton::Left));
        assert!(input.is_button_just_released(MouseButton::Left));
    }

    #[test]
    fn test_begin_frame_clears_just_pressed() {
        let mut input = InputState::new();
        press(&mut input, 100.0, 100.0);
        input.begin_frame();
        assert!(!input.is_button_just_pressed(MouseButton::Left));
        assert!(input.is_button_pressed(MouseButton::Left));
    }

    #[test]
    fn test_small_movement_stays_a_click() {
        let mut input = InputState::new();
        press(&mut input, 100.0, 100.0);
        move_to(&mut input, 102.0, 101.0);
        assert!(!input.is_dragging());

        release(&mut input, 102.0, 101.0);
        assert_eq!(input.click_released(), Some(Point::new(102.0, 101.0)));
    }

    #[test]
    fn test_drag_activates_past_threshold() {
        let mut input = InputState::new();
        press(&mut input, 100.0, 100.0);
        move_to(&mut input, 103.0, 100.0);
        assert!(!input.is_dragging());

        move_to(&mut input, 106.0, 100.0);
        assert!(input.is_dragging());
        assert!(input.drag_just_started());

        move_to(&mut input, 150.0, 120.0);
        let delta = input.drag_delta().unwrap();
        assert!((delta.x - 50.0).abs() < f64::EPSILON);
        assert!((delta.y - 20.0).abs() < f64::EPSILON);

        // Releasing a drag is not a click.
        release(&mut input, 150.0, 120.0);
        assert_eq!(input.click_released(), None);
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_scroll_accumulates_and_resets() {
        let mut input = InputState::new();
        input.handle_pointer_event(PointerEvent::Scroll {
            position: Point::new(100.0, 100.0),
            delta: Vec2::new(0.0, 10.0),
        });
        assert!((input.scroll_delta.y - 10.0).abs() < f64::EPSILON);

        input.begin_frame();
        assert!(input.scroll_delta.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed("a".to_string()));
        assert!(input.is_key_pressed("a"));
        assert!(input.is_key_just_pressed("a"));

        input.begin_frame();
        assert!(input.is_key_pressed("a"));
        assert!(!input.is_key_just_pressed("a"));
    }

    #[test]
    fn test_command_modifier() {
        let mut mods = Modifiers::default();
        assert!(!mods.command());
        mods.ctrl = true;
        assert!(mods.command());
        mods = Modifiers { meta: true, ..Default::default() };
        assert!(mods.command());
    }
}
