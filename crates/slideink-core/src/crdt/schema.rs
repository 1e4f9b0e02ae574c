//! Loro document schema and operations for the slide deck.

use loro::{
    Container, ExportMode, LoroDoc, LoroList, LoroMap, LoroResult, LoroValue, UndoManager,
    ValueOrContainer,
};
use thiserror::Error;

use super::convert::{
    self, element_from_loro, element_to_loro, slide_from_loro, SchemaError, KEY_MODE,
    KEY_SLIDE_ELEMENTS, KEY_SLIDE_ID,
};
use crate::deck::{Slide, SlideId, INITIAL_SLIDE_COUNT};
use crate::element::{ElementId, ElementMode, ElementUpdate, TextElement};

/// Key for the slide list in the document.
pub const SLIDES_KEY: &str = "slides";
/// Key for the document metadata map.
pub const META_KEY: &str = "meta";
/// Key for the schema version inside the metadata map.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";
/// Schema version written by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Errors loading a document snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Loro(#[from] loro::LoroError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A CRDT-backed slide deck document.
///
/// Wraps a `LoroDoc` holding an ordered list of slides, each an ordered
/// list of text elements, plus an `UndoManager` for local undo/redo.
/// Every public write commits exactly once, so each call is one
/// transaction and one undo step (unless history is paused).
pub struct DeckDocument {
    doc: LoroDoc,
    undo_manager: UndoManager,
    /// Nesting depth of pause_history calls; grouping ends at zero.
    pause_depth: u32,
}

impl DeckDocument {
    /// Create a new empty deck document. Call [`init_slides`] before any
    /// other write.
    ///
    /// [`init_slides`]: DeckDocument::init_slides
    pub fn new() -> Self {
        let doc = LoroDoc::new();
        let undo_manager = Self::make_undo_manager(&doc);
        Self { doc, undo_manager, pause_depth: 0 }
    }

    /// Load a deck from a snapshot, rejecting snapshots written by a
    /// newer schema.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let doc = LoroDoc::new();
        doc.import(bytes)?;
        let undo_manager = Self::make_undo_manager(&doc);
        let this = Self { doc, undo_manager, pause_depth: 0 };
        let version = this.schema_version();
        if version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion(version).into());
        }
        Ok(this)
    }

    fn make_undo_manager(doc: &LoroDoc) -> UndoManager {
        let mut undo_manager = UndoManager::new(doc);
        undo_manager.set_max_undo_steps(100);
        // Grouping is explicit via pause_history/resume_history; no
        // time-based merging.
        undo_manager.set_merge_interval(0);
        undo_manager
    }

    /// Get the underlying LoroDoc.
    pub fn loro_doc(&self) -> &LoroDoc {
        &self.doc
    }

    /// Schema version recorded in the document (current version for
    /// documents that predate the metadata map).
    pub fn schema_version(&self) -> i64 {
        let value = self.meta_map().get_deep_value();
        if let LoroValue::Map(map) = value {
            if let Some(LoroValue::I64(v)) = map.get(SCHEMA_VERSION_KEY) {
                return *v;
            }
        }
        SCHEMA_VERSION
    }

    // --- Container navigation ---

    fn slides_list(&self) -> LoroList {
        self.doc.get_list(SLIDES_KEY)
    }

    fn meta_map(&self) -> LoroMap {
        self.doc.get_map(META_KEY)
    }

    fn slide_map(&self, index: usize) -> Option<LoroMap> {
        match self.slides_list().get(index) {
            Some(ValueOrContainer::Container(Container::Map(m))) => Some(m),
            _ => None,
        }
    }

    fn elements_list(&self, index: usize) -> Option<LoroList> {
        match self.slide_map(index)?.get(KEY_SLIDE_ELEMENTS) {
            Some(ValueOrContainer::Container(Container::List(l))) => Some(l),
            _ => None,
        }
    }

    fn element_map(elements: &LoroList, index: usize) -> Option<LoroMap> {
        match elements.get(index) {
            Some(ValueOrContainer::Container(Container::Map(m))) => Some(m),
            _ => None,
        }
    }

    fn element_index(elements: &LoroList, id: &ElementId) -> Option<usize> {
        let id = id.to_string();
        for i in 0..elements.len() {
            if let Some(map) = Self::element_map(elements, i) {
                if let Some(ValueOrContainer::Value(LoroValue::String(s))) =
                    map.get(convert::KEY_ID)
                {
                    if s.as_ref() == id {
                        return Some(i);
                    }
                }
            }
        }
        None
    }

    // --- Reads ---

    /// Number of slides in the deck.
    pub fn slide_count(&self) -> usize {
        self.slides_list().len()
    }

    /// Whether the deck has been initialized with at least one slide.
    pub fn is_initialized(&self) -> bool {
        self.slide_count() > 0
    }

    /// Materialize every slide in deck order. Malformed slides and
    /// elements are logged and skipped.
    pub fn slides(&self) -> Vec<Slide> {
        let value = self.slides_list().get_deep_value();
        let mut out = Vec::new();
        if let LoroValue::List(items) = value {
            for item in items.iter() {
                let LoroValue::Map(slide_map) = item else {
                    log::warn!("skipping non-map slide record");
                    continue;
                };
                match slide_from_loro(slide_map) {
                    Ok(slide) => out.push(slide),
                    Err(err) => log::warn!("skipping malformed slide: {err}"),
                }
            }
        }
        out
    }

    /// Materialize a single slide.
    pub fn slide(&self, index: usize) -> Option<Slide> {
        let value = self.slides_list().get_deep_value();
        if let LoroValue::List(items) = value {
            if let Some(LoroValue::Map(slide_map)) = items.get(index) {
                return slide_from_loro(slide_map).ok();
            }
        }
        None
    }

    /// Stable id of the slide at `index`.
    pub fn slide_id(&self, index: usize) -> Option<SlideId> {
        let map = self.slide_map(index)?;
        if let Some(ValueOrContainer::Value(LoroValue::String(s))) = map.get(KEY_SLIDE_ID) {
            return s.parse().ok();
        }
        None
    }

    /// Materialize one element of a slide.
    pub fn get_element(&self, slide_index: usize, id: &ElementId) -> Option<TextElement> {
        let elements = self.elements_list(slide_index)?;
        let index = Self::element_index(&elements, id)?;
        let map = Self::element_map(&elements, index)?;
        if let LoroValue::Map(value) = map.get_deep_value() {
            return element_from_loro(&value).ok();
        }
        None
    }

    /// Find the element currently holding deck-wide focus, if any.
    pub fn active_element(&self) -> Option<(usize, ElementId)> {
        for (slide_index, slide) in self.slides().iter().enumerate() {
            for element in &slide.elements {
                if element.mode.is_active() {
                    return Some((slide_index, element.id));
                }
            }
        }
        None
    }

    // --- Writes ---

    /// Populate a fresh deck with `count` empty slides and stamp the
    /// schema version. Initialization is not undoable.
    pub fn init_slides(&mut self, count: usize) -> LoroResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        for _ in 0..count.max(1) {
            self.push_slide()?;
        }
        self.meta_map().insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
        self.doc.commit();
        self.undo_manager.clear();
        Ok(())
    }

    /// Populate a fresh deck with the default slide count.
    pub fn init_default(&mut self) -> LoroResult<()> {
        self.init_slides(INITIAL_SLIDE_COUNT)
    }

    fn push_slide(&self) -> LoroResult<SlideId> {
        let id = SlideId::new_v4();
        let slides = self.slides_list();
        let slide_map = slides.insert_container(slides.len(), LoroMap::new())?;
        slide_map.insert(KEY_SLIDE_ID, id.to_string())?;
        slide_map.insert_container(KEY_SLIDE_ELEMENTS, LoroList::new())?;
        Ok(id)
    }

    /// Append an empty slide to the deck.
    pub fn add_slide(&mut self) -> LoroResult<SlideId> {
        let id = self.push_slide()?;
        self.doc.commit();
        Ok(id)
    }

    /// Remove the slide at `index`. Returns false when the index is out
    /// of range. Callers enforce deck-level policy (a deck keeps at
    /// least one slide).
    pub fn remove_slide(&mut self, index: usize) -> LoroResult<bool> {
        let slides = self.slides_list();
        if index >= slides.len() {
            return Ok(false);
        }
        slides.delete(index, 1)?;
        self.doc.commit();
        Ok(true)
    }

    /// Append an element to a slide, demoting any other selected or
    /// editing element in the same transaction. Returns false when the
    /// slide does not exist.
    pub fn add_element(&mut self, slide_index: usize, element: &TextElement) -> LoroResult<bool> {
        let Some(elements) = self.elements_list(slide_index) else {
            return Ok(false);
        };
        if element.mode.is_active() {
            self.demote_active_elements(Some(&element.id))?;
        }
        let map = elements.insert_container(elements.len(), LoroMap::new())?;
        element_to_loro(element, &map)?;
        self.doc.commit();
        Ok(true)
    }

    /// Remove an element from a slide. Returns false when the slide or
    /// element does not exist.
    pub fn remove_element(&mut self, slide_index: usize, id: &ElementId) -> LoroResult<bool> {
        let Some(elements) = self.elements_list(slide_index) else {
            return Ok(false);
        };
        let Some(index) = Self::element_index(&elements, id) else {
            return Ok(false);
        };
        elements.delete(index, 1)?;
        self.doc.commit();
        Ok(true)
    }

    /// Set an element's interaction mode, demoting every other active
    /// element in the same transaction when the new mode takes focus.
    /// Returns false when the slide or element does not exist.
    pub fn set_element_mode(
        &mut self,
        slide_index: usize,
        id: &ElementId,
        mode: ElementMode,
    ) -> LoroResult<bool> {
        let Some(elements) = self.elements_list(slide_index) else {
            return Ok(false);
        };
        let Some(index) = Self::element_index(&elements, id) else {
            return Ok(false);
        };
        if mode.is_active() {
            self.demote_active_elements(Some(id))?;
        }
        let Some(map) = Self::element_map(&elements, index) else {
            return Ok(false);
        };
        map.insert(KEY_MODE, convert::mode_to_i64(mode))?;
        self.doc.commit();
        Ok(true)
    }

    /// Set every selected or editing element back to idle, except `keep`.
    /// Part of the caller's transaction; does not commit.
    fn demote_active_elements(&self, keep: Option<&ElementId>) -> LoroResult<()> {
        let keep = keep.map(|id| id.to_string());
        for slide_index in 0..self.slide_count() {
            let Some(elements) = self.elements_list(slide_index) else {
                continue;
            };
            for i in 0..elements.len() {
                let Some(map) = Self::element_map(&elements, i) else {
                    continue;
                };
                let id = match map.get(convert::KEY_ID) {
                    Some(ValueOrContainer::Value(LoroValue::String(s))) => s.to_string(),
                    _ => continue,
                };
                if keep.as_deref() == Some(id.as_str()) {
                    continue;
                }
                let mode = match map.get(KEY_MODE) {
                    Some(ValueOrContainer::Value(LoroValue::I64(v))) => v,
                    _ => continue,
                };
                if convert::i64_to_mode(mode).map(|m| m.is_active()).unwrap_or(false) {
                    map.insert(KEY_MODE, convert::mode_to_i64(ElementMode::Idle))?;
                }
            }
        }
        Ok(())
    }

    /// Merge a partial update into an element. Fields left `None` keep
    /// their stored value. Returns false when the slide or element does
    /// not exist; an empty update is a no-op that writes nothing.
    pub fn update_element(
        &mut self,
        slide_index: usize,
        id: &ElementId,
        update: &ElementUpdate,
    ) -> LoroResult<bool> {
        if update.is_empty() {
            return Ok(true);
        }
        let Some(elements) = self.elements_list(slide_index) else {
            return Ok(false);
        };
        let Some(index) = Self::element_index(&elements, id) else {
            return Ok(false);
        };
        let Some(map) = Self::element_map(&elements, index) else {
            return Ok(false);
        };

        if let Some(content) = &update.content {
            map.insert(convert::KEY_CONTENT, content.clone())?;
        }
        if let Some(transform) = &update.transform {
            map.insert(convert::KEY_X, transform.x)?;
            map.insert(convert::KEY_Y, transform.y)?;
            map.insert(convert::KEY_WIDTH, transform.width)?;
            map.insert(convert::KEY_HEIGHT, transform.height)?;
            map.insert(convert::KEY_ROTATION, transform.rotation)?;
        }
        if let Some(style) = &update.style {
            convert::style_to_loro(style, &map)?;
        }
        self.doc.commit();
        Ok(true)
    }

    // --- Undo/Redo API ---

    /// Undo the last change made by this peer.
    pub fn undo(&mut self) -> bool {
        self.undo_manager.undo().unwrap_or(false)
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.undo_manager.redo().unwrap_or(false)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_manager.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.undo_manager.redo_count()
    }

    /// Start grouping subsequent writes into a single undo step. Calls
    /// nest; grouping ends when every pause has been matched by a
    /// [`resume_history`](DeckDocument::resume_history).
    pub fn pause_history(&mut self) {
        if self.pause_depth == 0 {
            let _ = self.undo_manager.group_start();
        }
        self.pause_depth += 1;
    }

    /// Close one level of history grouping. Calling with no pause active
    /// is a no-op.
    pub fn resume_history(&mut self) {
        match self.pause_depth {
            0 => {}
            1 => {
                self.pause_depth = 0;
                self.undo_manager.group_end();
            }
            _ => self.pause_depth -= 1,
        }
    }

    /// Whether writes are currently being grouped.
    pub fn history_paused(&self) -> bool {
        self.pause_depth > 0
    }

    /// Clear undo/redo history.
    pub fn clear_undo_history(&self) {
        self.undo_manager.clear();
    }

    // --- Sync API ---

    /// Export the document as a snapshot (full state).
    pub fn export_snapshot(&self) -> Vec<u8> {
        self.doc.export(ExportMode::Snapshot).unwrap_or_default()
    }

    /// Export incremental updates since a version.
    pub fn export_updates(&self, since: &loro::VersionVector) -> Vec<u8> {
        self.doc.export(ExportMode::updates(since)).unwrap_or_default()
    }

    /// Import updates from another peer.
    pub fn import(&mut self, bytes: &[u8]) -> LoroResult<()> {
        self.doc.import(bytes)?;
        Ok(())
    }

    /// Get the current version vector.
    pub fn version(&self) -> loro::VersionVector {
        self.doc.oplog_vv()
    }
}

impl Default for DeckDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeckDocument {
    fn clone(&self) -> Self {
        // Clone creates a new document with fresh undo history.
        let bytes = self.export_snapshot();
        Self::from_snapshot(&bytes).unwrap_or_else(|_| Self::new())
    }
}
