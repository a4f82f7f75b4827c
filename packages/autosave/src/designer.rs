//! Edit session wired to autosave.
//!
//! Every mutation that changes the document is forwarded to the scheduler
//! as a fresh payload. Saved revisions flow back into the session through
//! [`Designer::sync`], which is what lets a refresh tell local edits apart
//! from a clean document.

use crate::machine::{AutosaveStatus, DesignPayload};
use crate::scheduler::{AutosaveError, AutosaveHandle};
use customfly_editor::{
    AssetLibrary, DraftElement, EditSession, EditorError, ElementPatch, Mutation, MutationResult, RefreshOutcome,
};
use customfly_model::CanvasElement;
use customfly_model::PageData;
use serde_json::Value;
use std::time::Instant;

pub struct Designer {
    session: EditSession,
    autosave: AutosaveHandle,
    name: String,
    config: Value,
}

impl Designer {
    pub fn new(session: EditSession, autosave: AutosaveHandle, name: impl Into<String>) -> Self {
        Self {
            session,
            autosave,
            name: name.into(),
            config: Value::Null,
        }
    }

    /// Editor configuration saved alongside the design
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&mut self, mutation: Mutation) -> MutationResult {
        self.forward(|session| session.apply(mutation))
    }

    pub fn update_live(&mut self, id: &str, patch: &ElementPatch, now: Instant) -> MutationResult {
        self.forward(|session| session.update_live(id, patch, now))
    }

    pub fn begin_gesture(&mut self) {
        self.session.begin_gesture();
    }

    pub fn end_gesture(&mut self) -> MutationResult {
        self.session.end_gesture()
    }

    pub fn tick(&mut self, now: Instant) -> MutationResult {
        self.session.tick(now)
    }

    /// Drafts live outside the document; only a committed draft is saved
    pub fn begin_draft(&mut self, template: CanvasElement) -> &DraftElement {
        self.session.begin_draft(template)
    }

    pub fn draft(&self) -> Option<&DraftElement> {
        self.session.draft()
    }

    pub fn update_draft(&mut self, patch: &ElementPatch) -> Result<bool, EditorError> {
        self.session.update_draft(patch)
    }

    pub fn commit_draft(&mut self, id: impl Into<String>) -> MutationResult {
        self.forward(|session| session.commit_draft(id))
    }

    pub fn discard_draft(&mut self) -> Option<DraftElement> {
        self.session.discard_draft()
    }

    pub fn link_options(&mut self, id: &str, asset_id: &str, library: &AssetLibrary) -> MutationResult {
        self.forward(|session| session.link_options(id, asset_id, library))
    }

    pub fn unlink_options(&mut self, id: &str) -> MutationResult {
        self.forward(|session| session.unlink_options(id))
    }

    pub fn undo(&mut self) -> bool {
        self.forward(|session| session.undo())
    }

    pub fn redo(&mut self) -> bool {
        self.forward(|session| session.redo())
    }

    pub fn status(&self) -> AutosaveStatus {
        self.autosave.status()
    }

    pub fn design_id(&self) -> Option<String> {
        self.autosave.status().design_id
    }

    /// Pull the last saved revision from the scheduler into the session
    pub fn sync(&mut self) -> AutosaveStatus {
        let status = self.autosave.status();
        if let Some(revision) = status.saved_revision {
            self.session.mark_saved(revision);
        }
        status
    }

    /// Offer server pages after a refresh; ignored while edits are unsaved
    pub fn receive_server_pages(&mut self, pages: Vec<PageData>) -> RefreshOutcome {
        self.sync();
        self.session.receive_server_pages(pages)
    }

    /// Save now and wait for the outcome
    pub async fn save_now(&mut self) -> Result<AutosaveStatus, AutosaveError> {
        self.autosave.flush().await?;
        Ok(self.sync())
    }

    /// Stop autosave, returning the session and the final status
    pub async fn close(self) -> Result<(EditSession, AutosaveStatus), AutosaveError> {
        let mut session = self.session;
        let status = self.autosave.shutdown().await?;
        if let Some(revision) = status.saved_revision {
            session.mark_saved(revision);
        }
        Ok((session, status))
    }

    fn forward<T>(&mut self, edit: impl FnOnce(&mut EditSession) -> T) -> T {
        let before = self.session.revision();
        let result = edit(&mut self.session);
        if self.session.revision() != before {
            self.autosave.record_change(self.payload());
        }
        result
    }

    fn payload(&self) -> DesignPayload {
        DesignPayload {
            revision: self.session.revision(),
            name: self.name.clone(),
            pages: self.session.pages().to_vec(),
            config: self.config.clone(),
        }
    }
}
