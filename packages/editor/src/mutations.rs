//! # Design Mutations
//!
//! Semantic operations on a design document, as issued by editing panels.
//!
//! ## Semantics
//!
//! ### Add
//! - Appends to the active page and selects the new element
//! - Assigns a zIndex when absent
//! - Refuses the reserved `draft` id and ids already on the page
//!
//! ### Update
//! - Shallow merge of a JSON patch into the element (`{ ...el, ...patch }`)
//! - `null` resets a field to its type default
//! - `type` and `id` cannot change
//! - Live: does not create a history entry on its own
//!
//! ### Missing entities
//! - Every operation on an unknown element or page is a no-op, never an
//!   error. Panels can hold stale ids briefly while unmounting.

use crate::errors::EditorError;
use customfly_model::CanvasElement;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Append an element to the active page
    AddElement { element: CanvasElement },

    /// Merge a patch into an element without committing history
    UpdateElement { id: String, patch: ElementPatch },

    /// Merge a patch and commit history immediately
    CommitUpdate { id: String, patch: ElementPatch },

    /// Remove an element from the active page
    DeleteElement { id: String },

    /// Copy an element, offset and on top
    DuplicateElement { id: String },

    /// Change an element's paint order
    ReorderElement { id: String, direction: ReorderDirection },

    /// Select an element on the active page (`None` clears)
    SelectElement {
        #[serde(default)]
        id: Option<String>,
    },

    /// Switch the active page
    SetActivePage { id: String },

    /// Append a new page and make it active
    AddPage {
        #[serde(default)]
        name: Option<String>,
    },

    DeletePage { id: String },

    RenamePage { id: String, name: String },

    /// Commit pending live updates as one history entry
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderDirection {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
}

/// Partial element update, as a JSON object merged key by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementPatch(Map<String, Value>);

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from a JSON value; `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Set a field (camelCase wire name)
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Reset a field to its type default
    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.0.insert(key.into(), Value::Null);
        self
    }

    pub fn position(self, x: f64, y: f64) -> Self {
        self.set("x", x).set("y", y)
    }

    pub fn size(self, width: f64, height: f64) -> Self {
        self.set("width", width).set("height", height)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge into `element`, returning the updated copy
    pub fn apply_to(&self, element: &CanvasElement) -> Result<CanvasElement, EditorError> {
        let mut fields = match serde_json::to_value(element)? {
            Value::Object(map) => map,
            _ => return Err(EditorError::InvalidPatch("element is not an object".to_string())),
        };

        for (key, value) in &self.0 {
            match key.as_str() {
                "type" => {
                    if fields.get("type") != Some(value) {
                        return Err(EditorError::TypeChange {
                            from: element.element_type(),
                            to: value.as_str().unwrap_or("?").to_string(),
                        });
                    }
                }
                "id" => {
                    if value.as_str() != Some(element.id()) {
                        return Err(EditorError::IdChange);
                    }
                }
                _ if value.is_null() => {
                    fields.remove(key);
                }
                _ => {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }

        serde_json::from_value(Value::Object(fields)).map_err(|e| EditorError::InvalidPatch(e.to_string()))
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum MutationResult {
    /// Mutation was applied; `revision` is the document revision after it
    Applied { revision: u64 },

    /// Mutation had no effect (unknown id, reserved id, bound reached, ...)
    Noop { reason: String },
}

impl MutationResult {
    pub fn noop(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::debug!(%reason, "mutation ignored");
        MutationResult::Noop { reason }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, MutationResult::Applied { .. })
    }
}
