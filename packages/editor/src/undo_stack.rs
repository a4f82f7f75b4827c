//! # Undo/Redo Stack
//!
//! Snapshot history for the document composer.
//!
//! ## Design
//!
//! - One ordered list of immutable [`Snapshot`]s plus a cursor at the
//!   current entry. Entry 0 is the document as loaded.
//! - Commit truncates everything after the cursor (the stale redo branch),
//!   appends, and advances the cursor.
//! - Undo/redo only move the cursor.
//! - Capped at `max_levels` entries, evicting oldest first (0 = unlimited).
//!
//! Snapshots own their pages outright, so later edits of live state can
//! never reach back into history.
//!
//! ## Example
//!
//! ```rust
//! use customfly_editor::{Snapshot, UndoStack};
//! use customfly_model::default_pages;
//!
//! let mut stack = UndoStack::new(Snapshot::new(default_pages(), None));
//! assert!(!stack.can_undo());
//!
//! stack.commit(Snapshot::new(vec![], None));
//! assert!(stack.undo().is_some());
//! assert!(stack.redo().is_some());
//! ```

use customfly_model::PageData;
use std::collections::VecDeque;

/// Default number of retained entries
pub const DEFAULT_MAX_LEVELS: usize = 100;

/// Document state at one point in history
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub pages: Vec<PageData>,
    pub selected_element_id: Option<String>,
}

impl Snapshot {
    pub fn new(pages: Vec<PageData>, selected_element_id: Option<String>) -> Self {
        Self {
            pages,
            selected_element_id,
        }
    }
}

/// Bounded snapshot log with a cursor
#[derive(Debug)]
pub struct UndoStack {
    entries: VecDeque<Snapshot>,

    /// Index of the current entry; always within `[0, len - 1]`
    cursor: usize,

    /// Maximum number of entries kept (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a stack with the default cap
    pub fn new(initial: Snapshot) -> Self {
        Self::with_max_levels(initial, DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(initial: Snapshot, max_levels: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            max_levels,
        }
    }

    /// Record a new entry, discarding the redo branch
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.max_levels > 0 {
            while self.entries.len() > self.max_levels.max(1) {
                self.entries.pop_front();
                self.cursor -= 1;
            }
        }

        tracing::debug!(cursor = self.cursor, len = self.entries.len(), "history commit");
    }

    /// Step back one entry, returning the entry now current
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry, returning the entry now current
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Drop all history and start over from a new baseline
    pub fn reset(&mut self, baseline: Snapshot) {
        self.entries.clear();
        self.entries.push_back(baseline);
        self.cursor = 0;
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of undo steps available
    pub fn undo_levels(&self) -> usize {
        self.cursor
    }

    /// Number of redo steps available
    pub fn redo_levels(&self) -> usize {
        self.entries.len() - 1 - self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }
}
