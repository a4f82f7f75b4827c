//! # Edit Session
//!
//! One editor's view of a design: the [`Composer`] plus the state that sits
//! around it while a person is working.
//!
//! - **Gestures**: a run of live updates (a drag, typing) becomes one
//!   history entry when the gesture ends, or once updates have been idle
//!   for `coalesce_window` (see [`EditSession::tick`]).
//! - **Draft**: an element being set up before placement, outside history.
//! - **Saved revision**: the document revision last loaded or persisted.
//!   Refreshed server pages are only adopted while nothing is unsaved.

use crate::assets::AssetLibrary;
use crate::document::Composer;
use crate::draft::DraftElement;
use crate::errors::EditorError;
use crate::mutations::{ElementPatch, Mutation, MutationResult};
use crate::undo_stack::DEFAULT_MAX_LEVELS;
use customfly_model::{CanvasElement, PageData};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Maximum history entries (0 = unlimited)
    pub history_limit: usize,

    /// Idle time after which live updates are committed
    pub coalesce_window_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_MAX_LEVELS,
            coalesce_window_ms: 500,
        }
    }
}

impl SessionConfig {
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }
}

/// What happened to pages pushed from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Pages replaced the local document
    Adopted,
    /// Local edits are unsaved; pages were ignored
    Ignored,
}

#[derive(Debug)]
pub struct EditSession {
    composer: Composer,
    config: SessionConfig,
    draft: Option<DraftElement>,

    /// Inside an explicit gesture; the idle commit is suspended
    gesture_active: bool,

    last_live_update: Option<Instant>,

    saved_revision: u64,
}

impl EditSession {
    pub fn new(pages: Vec<PageData>, config: SessionConfig) -> Self {
        let composer = Composer::with_history_limit(pages, config.history_limit);
        let saved_revision = composer.revision();
        Self {
            composer,
            config,
            draft: None,
            gesture_active: false,
            last_live_update: None,
            saved_revision,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn pages(&self) -> &[PageData] {
        self.composer.pages()
    }

    pub fn revision(&self) -> u64 {
        self.composer.revision()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Apply a mutation. Live updates are timestamped now.
    pub fn apply(&mut self, mutation: Mutation) -> MutationResult {
        match mutation {
            Mutation::UpdateElement { id, patch } => self.update_live(&id, &patch, Instant::now()),
            other => self.composer.apply(other),
        }
    }

    /// Live update, committed later by the gesture or the idle window
    pub fn update_live(&mut self, id: &str, patch: &ElementPatch, now: Instant) -> MutationResult {
        let result = self.composer.update_element(id, patch);
        if result.is_applied() {
            self.last_live_update = Some(now);
        }
        result
    }

    pub fn begin_gesture(&mut self) {
        self.gesture_active = true;
    }

    /// End the current gesture, committing its live updates as one entry
    pub fn end_gesture(&mut self) -> MutationResult {
        self.gesture_active = false;
        self.last_live_update = None;
        self.composer.commit()
    }

    /// Commit live updates that have been idle for the coalesce window
    pub fn tick(&mut self, now: Instant) -> MutationResult {
        if self.gesture_active || !self.composer.has_uncommitted() {
            return MutationResult::Noop {
                reason: "no idle live updates".to_string(),
            };
        }
        match self.last_live_update {
            Some(at) if now.saturating_duration_since(at) < self.config.coalesce_window() => {
                MutationResult::Noop {
                    reason: "coalesce window still open".to_string(),
                }
            }
            _ => {
                self.last_live_update = None;
                self.composer.commit()
            }
        }
    }

    /// Link an option element to a set from `library`, as one history entry
    pub fn link_options(&mut self, id: &str, asset_id: &str, library: &AssetLibrary) -> MutationResult {
        self.composer.link_options(id, asset_id, library)
    }

    pub fn unlink_options(&mut self, id: &str) -> MutationResult {
        self.composer.unlink_options(id)
    }

    pub fn undo(&mut self) -> bool {
        self.gesture_active = false;
        self.composer.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.gesture_active = false;
        self.composer.redo()
    }

    /// Start a draft, replacing any previous one
    pub fn begin_draft(&mut self, template: CanvasElement) -> &DraftElement {
        self.draft.insert(DraftElement::new(template))
    }

    pub fn draft(&self) -> Option<&DraftElement> {
        self.draft.as_ref()
    }

    pub fn update_draft(&mut self, patch: &ElementPatch) -> Result<bool, EditorError> {
        match self.draft.as_mut() {
            Some(draft) => draft.update(patch).map(|_| true),
            None => Ok(false),
        }
    }

    /// Place the draft under `id` as a regular add
    pub fn commit_draft(&mut self, id: impl Into<String>) -> MutationResult {
        let Some(draft) = self.draft.take() else {
            return MutationResult::noop("no draft in progress");
        };
        let result = self.composer.add_element(draft.clone().promote(id));
        if !result.is_applied() {
            self.draft = Some(draft);
        }
        result
    }

    pub fn discard_draft(&mut self) -> Option<DraftElement> {
        self.draft.take()
    }

    /// Whether the document changed since it was last loaded or saved
    pub fn has_unsaved_edits(&self) -> bool {
        self.composer.revision() != self.saved_revision
    }

    pub fn saved_revision(&self) -> u64 {
        self.saved_revision
    }

    /// Record that `revision` was persisted
    pub fn mark_saved(&mut self, revision: u64) {
        if revision > self.saved_revision {
            self.saved_revision = revision;
        }
    }

    /// Offer pages fetched from the server after a refresh.
    ///
    /// Adopted only when there are no local edits since the last load or
    /// save. Adoption resets history.
    pub fn receive_server_pages(&mut self, pages: Vec<PageData>) -> RefreshOutcome {
        if self.has_unsaved_edits() || self.composer.has_uncommitted() {
            tracing::warn!(
                revision = self.composer.revision(),
                saved_revision = self.saved_revision,
                "ignoring refreshed pages: local edits are unsaved"
            );
            return RefreshOutcome::Ignored;
        }

        self.composer.load(pages);
        self.saved_revision = self.composer.revision();
        self.last_live_update = None;
        tracing::debug!(revision = self.saved_revision, "adopted refreshed pages");
        RefreshOutcome::Adopted
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(Vec::new(), SessionConfig::default())
    }
}
