//! SlideInk Core Library
//!
//! Platform-agnostic interaction core for the SlideInk collaborative
//! slide editor: the deck model, the element interaction state machine,
//! drag/resize geometry, CRDT-backed shared state, gesture-scoped undo
//! batching, and scroll visibility tracking.

pub mod clipboard;
pub mod collab;
pub mod coordinator;
pub mod crdt;
pub mod deck;
pub mod element;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;
pub mod visibility;

pub use collab::{AuthProvider, ConnectionState, RoomSession};
pub use coordinator::SlideCoordinator;
pub use crdt::DeckDocument;
pub use deck::{Slide, SlideId, INITIAL_SLIDE_COUNT};
pub use element::{ElementId, ElementMode, ElementUpdate, TextElement, TextStyle, Transform};
pub use geometry::{clamp_drag, resize, CanvasBounds, ResizeEdge};
pub use history::HistoryBatcher;
pub use input::InputState;
pub use interaction::{transition, ClickArbiter, ClickResolution, InteractionEvent};
pub use session::EditorSession;
pub use shortcuts::ShortcutAction;
pub use visibility::VisibilityTracker;
