//! In-progress element that has not been placed yet.
//!
//! A draft carries the reserved `draft` id and lives outside the document,
//! so it never enters history. Promotion gives it a real id and hands it to
//! the composer as a normal add.

use crate::errors::EditorError;
use crate::mutations::ElementPatch;
use customfly_model::{CanvasElement, DRAFT_ID};

#[derive(Debug, Clone, PartialEq)]
pub struct DraftElement {
    element: CanvasElement,
}

impl DraftElement {
    /// Start a draft from a template; its id is replaced by `draft`
    pub fn new(mut element: CanvasElement) -> Self {
        element.base.id = DRAFT_ID.to_string();
        Self { element }
    }

    pub fn element(&self) -> &CanvasElement {
        &self.element
    }

    /// Merge a patch into the draft. The reserved id stays.
    pub fn update(&mut self, patch: &ElementPatch) -> Result<(), EditorError> {
        self.element = patch.apply_to(&self.element)?;
        Ok(())
    }

    /// Give the draft its real id
    pub fn promote(self, id: impl Into<String>) -> CanvasElement {
        let mut element = self.element;
        element.base.id = id.into();
        element
    }
}
