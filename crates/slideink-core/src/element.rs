//! Text element model: transform, style, and interaction mode.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a text element.
pub type ElementId = Uuid;

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Used for element creation timestamps; works on native and wasm32.
pub fn timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Interaction mode of an element.
///
/// The persisted `mode` field on the element is the single owner of this
/// state; at most one element across the whole deck may be `Selected` or
/// `Editing` at any committed point (enforced by the mutation coordinator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElementMode {
    /// No focus ring, draggable.
    #[default]
    Idle,
    /// Shows focus ring, draggable.
    Selected,
    /// Text editing active, not draggable.
    Editing,
}

impl ElementMode {
    /// Check if the element holds the deck-wide focus (selected or editing).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Selected | Self::Editing)
    }

    /// Check if the element is in editing mode.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing)
    }
}

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string (`#rgb`, `#rrggbb`, or `#rrggbbaa`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?.trim();
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b, 255))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Format as `#rrggbb` (alpha omitted when opaque) for the UI layer.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        // Default text color of the editor theme.
        Self::new(0xe4, 0xe4, 0xe7, 255)
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    Light,
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            FontWeight::Light => "Light",
            FontWeight::Normal => "Normal",
            FontWeight::Bold => "Bold",
        }
    }

    /// Get all available font weights.
    pub fn all() -> &'static [FontWeight] {
        &[FontWeight::Light, FontWeight::Normal, FontWeight::Bold]
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    Strikethrough,
}

/// Presentational style of a text element. No invariants beyond valid
/// enum membership; never consulted by the geometry or mutation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in canvas units.
    pub font_size: f64,
    pub font_weight: FontWeight,
    /// Font family name (None = inherit the editor default).
    #[serde(default)]
    pub font_family: Option<String>,
    pub color: Color,
    pub align: TextAlign,
    #[serde(default)]
    pub decoration: TextDecoration,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_family: None,
            color: Color::default(),
            align: TextAlign::Left,
            decoration: TextDecoration::None,
        }
    }
}

/// Position and size of an element on the slide canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
}

impl Transform {
    /// Default placement of a freshly created element (roughly centered).
    pub const DEFAULT: Transform = Transform {
        x: 300.0,
        y: 200.0,
        width: 200.0,
        height: 50.0,
        rotation: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, rotation: 0.0 }
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bounding rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Copy with the origin shifted by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self { x: self.x + delta.x, y: self.y + delta.y, ..*self }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A positioned, styled free-text overlay on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub content: String,
    pub transform: Transform,
    pub style: TextStyle,
    /// Creation time in epoch milliseconds; consulted by the history
    /// batcher's grace window.
    pub created_at: i64,
    pub mode: ElementMode,
}

impl TextElement {
    /// Placeholder content for a freshly created element.
    pub const DEFAULT_CONTENT: &'static str = "Double click to edit";

    /// Create a new element at the default position.
    ///
    /// New elements start in `Selected` mode so they are immediately
    /// interactive; deck-wide exclusivity is the coordinator's job.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            content: Self::DEFAULT_CONTENT.to_string(),
            transform: Transform::DEFAULT,
            style: TextStyle::default(),
            created_at: timestamp_ms(),
            mode: ElementMode::Selected,
        }
    }

    /// Set the content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Override the creation timestamp (for tests and remote materialization).
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }
}

impl Default for TextElement {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial update merged into an element by the coordinator.
///
/// Fields left as `None` keep the stored value; used for per-keystroke
/// content updates and per-frame transform updates during drag/resize.
#[derive(Debug, Clone, Default)]
pub struct ElementUpdate {
    pub content: Option<String>,
    pub transform: Option<Transform>,
    pub style: Option<TextStyle>,
}

impl ElementUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self { content: Some(content.into()), ..Default::default() }
    }

    pub fn transform(transform: Transform) -> Self {
        Self { transform: Some(transform), ..Default::default() }
    }

    pub fn style(style: TextStyle) -> Self {
        Self { style: Some(style), ..Default::default() }
    }

    /// True when the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.transform.is_none() && self.style.is_none()
    }
}
