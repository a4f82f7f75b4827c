//! # Customfly Editor
//!
//! Editing engine for product customizer designs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ panels / CLI: Mutation values               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: gestures, draft, saved revision    │
//! │  - Coalesce live updates into one entry     │
//! │  - Adopt server pages only when clean       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ composer: pages + active page + selection   │
//! │  - Apply mutations (no-op on stale ids)     │
//! │  - Snapshot history with undo/redo          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots, not deltas**: every history entry owns a full copy of
//!    the pages, so undo is a cursor move
//! 2. **Stale ids are harmless**: mutations on missing elements are no-ops
//! 3. **Element types are fixed**: updates merge fields, never change `type`
//!
//! ## Usage
//!
//! ```rust
//! use customfly_editor::{EditSession, ElementPatch, Mutation, SessionConfig};
//! use customfly_model::CanvasElement;
//!
//! let mut session = EditSession::new(Vec::new(), SessionConfig::default());
//!
//! session.apply(Mutation::AddElement {
//!     element: CanvasElement::text("title", "Hello"),
//! });
//! session.apply(Mutation::CommitUpdate {
//!     id: "title".to_string(),
//!     patch: ElementPatch::new().position(40.0, 60.0),
//! });
//!
//! assert!(session.undo());
//! assert_eq!(session.composer().active_page().element("title").unwrap().base.x, 0.0);
//! ```

mod assets;
mod document;
mod draft;
mod errors;
mod mutations;
mod session;
mod undo_stack;

pub use assets::{link_status, linked_patch, unlinked_patch, AssetLibrary, ColorAsset, FontAsset, LinkStatus, OptionSet};
pub use document::{Composer, DUPLICATE_OFFSET, MAX_PAGES};
pub use draft::DraftElement;
pub use errors::EditorError;
pub use mutations::{ElementPatch, Mutation, MutationResult, ReorderDirection};
pub use session::{EditSession, RefreshOutcome, SessionConfig};
pub use undo_stack::{Snapshot, UndoStack, DEFAULT_MAX_LEVELS};
