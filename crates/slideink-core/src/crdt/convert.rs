//! Conversion between deck model types and Loro values.
//!
//! The element record is a closed schema: fields a peer sends that this
//! version does not know are rejected with [`SchemaError::UnknownField`]
//! instead of being passed through.

use loro::{LoroMap, LoroMapValue, LoroResult, LoroValue};
use thiserror::Error;
use uuid::Uuid;

use crate::deck::Slide;
use crate::element::{
    Color, ElementMode, FontWeight, TextAlign, TextDecoration, TextElement, TextStyle, Transform,
};

// Slide keys
pub(crate) const KEY_SLIDE_ID: &str = "id";
pub(crate) const KEY_SLIDE_ELEMENTS: &str = "elements";

// Element keys
pub(crate) const KEY_ID: &str = "id";
pub(crate) const KEY_CONTENT: &str = "content";
pub(crate) const KEY_X: &str = "x";
pub(crate) const KEY_Y: &str = "y";
pub(crate) const KEY_WIDTH: &str = "width";
pub(crate) const KEY_HEIGHT: &str = "height";
pub(crate) const KEY_ROTATION: &str = "rotation";
pub(crate) const KEY_FONT_SIZE: &str = "font_size";
pub(crate) const KEY_FONT_WEIGHT: &str = "font_weight";
pub(crate) const KEY_FONT_FAMILY: &str = "font_family";
pub(crate) const KEY_COLOR: &str = "color";
pub(crate) const KEY_ALIGN: &str = "align";
pub(crate) const KEY_DECORATION: &str = "decoration";
pub(crate) const KEY_CREATED_AT: &str = "created_at";
pub(crate) const KEY_MODE: &str = "mode";

/// Every key a version-1 element record may carry.
const ELEMENT_KEYS: &[&str] = &[
    KEY_ID,
    KEY_CONTENT,
    KEY_X,
    KEY_Y,
    KEY_WIDTH,
    KEY_HEIGHT,
    KEY_ROTATION,
    KEY_FONT_SIZE,
    KEY_FONT_WEIGHT,
    KEY_FONT_FAMILY,
    KEY_COLOR,
    KEY_ALIGN,
    KEY_DECORATION,
    KEY_CREATED_AT,
    KEY_MODE,
];

const SLIDE_KEYS: &[&str] = &[KEY_SLIDE_ID, KEY_SLIDE_ELEMENTS];

/// Errors materializing deck records from the shared document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("invalid value for field `{0}`")]
    InvalidField(&'static str),
    #[error("out-of-range value {value} for enum field `{field}`")]
    InvalidEnum { field: &'static str, value: i64 },
    #[error("unsupported schema version {0}")]
    UnsupportedVersion(i64),
}

fn get_double(map: &LoroMapValue, key: &'static str) -> Result<f64, SchemaError> {
    match map.get(key) {
        Some(LoroValue::Double(d)) => Ok(*d),
        Some(LoroValue::I64(i)) => Ok(*i as f64),
        Some(_) => Err(SchemaError::InvalidField(key)),
        None => Err(SchemaError::MissingField(key)),
    }
}

fn get_i64(map: &LoroMapValue, key: &'static str) -> Result<i64, SchemaError> {
    match map.get(key) {
        Some(LoroValue::I64(i)) => Ok(*i),
        Some(LoroValue::Double(d)) => Ok(*d as i64),
        Some(_) => Err(SchemaError::InvalidField(key)),
        None => Err(SchemaError::MissingField(key)),
    }
}

fn get_string(map: &LoroMapValue, key: &'static str) -> Result<String, SchemaError> {
    match map.get(key) {
        Some(LoroValue::String(s)) => Ok(s.to_string()),
        Some(_) => Err(SchemaError::InvalidField(key)),
        None => Err(SchemaError::MissingField(key)),
    }
}

/// Write an element's fields into a Loro map.
pub fn element_to_loro(element: &TextElement, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_ID, element.id.to_string())?;
    map.insert(KEY_CONTENT, element.content.clone())?;
    map.insert(KEY_X, element.transform.x)?;
    map.insert(KEY_Y, element.transform.y)?;
    map.insert(KEY_WIDTH, element.transform.width)?;
    map.insert(KEY_HEIGHT, element.transform.height)?;
    map.insert(KEY_ROTATION, element.transform.rotation)?;
    map.insert(KEY_CREATED_AT, element.created_at)?;
    map.insert(KEY_MODE, mode_to_i64(element.mode))?;
    style_to_loro(&element.style, map)?;
    Ok(())
}

/// Write the style fields into a Loro map.
pub fn style_to_loro(style: &TextStyle, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_FONT_SIZE, style.font_size)?;
    map.insert(KEY_FONT_WEIGHT, weight_to_i64(style.font_weight))?;
    map.insert(KEY_COLOR, style.color.to_hex())?;
    map.insert(KEY_ALIGN, align_to_i64(style.align))?;
    map.insert(KEY_DECORATION, decoration_to_i64(style.decoration))?;
    match &style.font_family {
        Some(family) => map.insert(KEY_FONT_FAMILY, family.clone())?,
        None => {
            let _ = map.delete(KEY_FONT_FAMILY);
        }
    }
    Ok(())
}

/// Materialize an element from a Loro map value.
pub fn element_from_loro(map: &LoroMapValue) -> Result<TextElement, SchemaError> {
    for key in map.keys() {
        if !ELEMENT_KEYS.contains(&key.as_str()) {
            return Err(SchemaError::UnknownField(key.clone()));
        }
    }

    let id = Uuid::parse_str(&get_string(map, KEY_ID)?)
        .map_err(|_| SchemaError::InvalidField(KEY_ID))?;
    let content = get_string(map, KEY_CONTENT)?;
    let transform = Transform {
        x: get_double(map, KEY_X)?,
        y: get_double(map, KEY_Y)?,
        width: get_double(map, KEY_WIDTH)?,
        height: get_double(map, KEY_HEIGHT)?,
        rotation: get_double(map, KEY_ROTATION).unwrap_or(0.0),
    };
    let style = style_from_loro(map)?;
    let created_at = get_i64(map, KEY_CREATED_AT)?;
    let mode = i64_to_mode(get_i64(map, KEY_MODE)?)?;

    Ok(TextElement { id, content, transform, style, created_at, mode })
}

fn style_from_loro(map: &LoroMapValue) -> Result<TextStyle, SchemaError> {
    let color_hex = get_string(map, KEY_COLOR)?;
    let color = Color::from_hex(&color_hex).ok_or(SchemaError::InvalidField(KEY_COLOR))?;
    let font_family = match map.get(KEY_FONT_FAMILY) {
        Some(LoroValue::String(s)) => Some(s.to_string()),
        Some(_) => return Err(SchemaError::InvalidField(KEY_FONT_FAMILY)),
        None => None,
    };

    Ok(TextStyle {
        font_size: get_double(map, KEY_FONT_SIZE)?,
        font_weight: i64_to_weight(get_i64(map, KEY_FONT_WEIGHT)?)?,
        font_family,
        color,
        align: i64_to_align(get_i64(map, KEY_ALIGN)?)?,
        decoration: i64_to_decoration(get_i64(map, KEY_DECORATION)?)?,
    })
}

/// Materialize a slide from a Loro map value.
///
/// Elements that fail the schema check are logged and skipped; a remote
/// peer shipping a malformed element must not take down the local view.
pub fn slide_from_loro(map: &LoroMapValue) -> Result<Slide, SchemaError> {
    for key in map.keys() {
        if !SLIDE_KEYS.contains(&key.as_str()) {
            return Err(SchemaError::UnknownField(key.clone()));
        }
    }

    let id = Uuid::parse_str(&get_string(map, KEY_SLIDE_ID)?)
        .map_err(|_| SchemaError::InvalidField(KEY_SLIDE_ID))?;

    let mut elements = Vec::new();
    match map.get(KEY_SLIDE_ELEMENTS) {
        Some(LoroValue::List(items)) => {
            for item in items.iter() {
                let LoroValue::Map(element_map) = item else {
                    log::warn!("skipping non-map element record on slide {id}");
                    continue;
                };
                match element_from_loro(element_map) {
                    Ok(el) => elements.push(el),
                    Err(err) => log::warn!("skipping malformed element on slide {id}: {err}"),
                }
            }
        }
        Some(_) => return Err(SchemaError::InvalidField(KEY_SLIDE_ELEMENTS)),
        None => return Err(SchemaError::MissingField(KEY_SLIDE_ELEMENTS)),
    }

    Ok(Slide { id, elements })
}

// Enum conversion helpers. Reading is strict: an out-of-range value is a
// schema error, not a silent default.

pub(crate) fn mode_to_i64(mode: ElementMode) -> i64 {
    match mode {
        ElementMode::Idle => 0,
        ElementMode::Selected => 1,
        ElementMode::Editing => 2,
    }
}

pub(crate) fn i64_to_mode(v: i64) -> Result<ElementMode, SchemaError> {
    match v {
        0 => Ok(ElementMode::Idle),
        1 => Ok(ElementMode::Selected),
        2 => Ok(ElementMode::Editing),
        _ => Err(SchemaError::InvalidEnum { field: KEY_MODE, value: v }),
    }
}

fn weight_to_i64(w: FontWeight) -> i64 {
    match w {
        FontWeight::Light => 0,
        FontWeight::Normal => 1,
        FontWeight::Bold => 2,
    }
}

fn i64_to_weight(v: i64) -> Result<FontWeight, SchemaError> {
    match v {
        0 => Ok(FontWeight::Light),
        1 => Ok(FontWeight::Normal),
        2 => Ok(FontWeight::Bold),
        _ => Err(SchemaError::InvalidEnum { field: KEY_FONT_WEIGHT, value: v }),
    }
}

fn align_to_i64(a: TextAlign) -> i64 {
    match a {
        TextAlign::Left => 0,
        TextAlign::Center => 1,
        TextAlign::Right => 2,
    }
}

fn i64_to_align(v: i64) -> Result<TextAlign, SchemaError> {
    match v {
        0 => Ok(TextAlign::Left),
        1 => Ok(TextAlign::Center),
        2 => Ok(TextAlign::Right),
        _ => Err(SchemaError::InvalidEnum { field: KEY_ALIGN, value: v }),
    }
}

fn decoration_to_i64(d: TextDecoration) -> i64 {
    match d {
        TextDecoration::None => 0,
        TextDecoration::Underline => 1,
        TextDecoration::Strikethrough => 2,
    }
}

fn i64_to_decoration(v: i64) -> Result<TextDecoration, SchemaError> {
    match v {
        0 => Ok(TextDecoration::None),
        1 => Ok(TextDecoration::Underline),
        2 => Ok(TextDecoration::Strikethrough),
        _ => Err(SchemaError::InvalidEnum { field: KEY_DECORATION, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loro::LoroDoc;

    fn store(element: &TextElement) -> (LoroDoc, LoroMap) {
        let doc = LoroDoc::new();
        let map = doc.get_map("element");
        element_to_loro(element, &map).unwrap();
        (doc, map)
    }

    fn value_of(map: &LoroMap) -> LoroMapValue {
        match map.get_deep_value() {
            LoroValue::Map(value) => value,
            other => panic!("expected map value, got {other:?}"),
        }
    }

    #[test]
    fn test_element_roundtrip() {
        let element = TextElement::new().with_content("styled").with_style(TextStyle {
            font_size: 24.0,
            font_weight: FontWeight::Bold,
            font_family: Some("Inter".to_string()),
            color: Color::new(0x12, 0x34, 0x56, 255),
            align: TextAlign::Center,
            decoration: TextDecoration::Underline,
        });
        let (_doc, map) = store(&element);

        let back = element_from_loro(&value_of(&map)).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_absent_font_family_stays_absent() {
        let element = TextElement::new();
        let (_doc, map) = store(&element);

        let back = element_from_loro(&value_of(&map)).unwrap();
        assert_eq!(back.style.font_family, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let element = TextElement::new();
        let (_doc, map) = store(&element);
        map.insert("z_index", 3i64).unwrap();

        let err = element_from_loro(&value_of(&map)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField(field) if field == "z_index"));
    }

    #[test]
    fn test_out_of_range_enum_is_rejected() {
        let element = TextElement::new();
        let (_doc, map) = store(&element);
        map.insert(KEY_MODE, 9i64).unwrap();

        let err = element_from_loro(&value_of(&map)).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidEnum { field: KEY_MODE, value: 9 }));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let doc = LoroDoc::new();
        let map = doc.get_map("element");
        map.insert(KEY_ID, Uuid::new_v4().to_string()).unwrap();

        let err = element_from_loro(&value_of(&map)).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField(_)));
    }

    #[test]
    fn test_rotation_defaults_when_absent() {
        let element = TextElement::new();
        let (_doc, map) = store(&element);
        map.delete(KEY_ROTATION).unwrap();

        let back = element_from_loro(&value_of(&map)).unwrap();
        assert!(back.transform.rotation.abs() < f64::EPSILON);
    }
}
