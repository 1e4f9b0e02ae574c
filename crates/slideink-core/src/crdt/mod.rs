//! CRDT-backed shared deck state.
//!
//! The deck lives in a Loro document so that concurrent edits from
//! multiple peers merge without conflicts. [`DeckDocument`] is the only
//! write path; everything above it works with materialized [`Slide`]
//! values.
//!
//! [`Slide`]: crate::deck::Slide

mod convert;
mod schema;

pub use convert::SchemaError;
pub use schema::{
    DeckDocument, SnapshotError, META_KEY, SCHEMA_VERSION, SCHEMA_VERSION_KEY, SLIDES_KEY,
};

pub use loro::{ExportMode, VersionVector};
