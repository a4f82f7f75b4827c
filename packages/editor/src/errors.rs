//! Error types for the editor

use customfly_model::ElementType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Element type is immutable: {from} cannot become {to}")]
    TypeChange { from: ElementType, to: String },

    #[error("Element id cannot be changed by an update")]
    IdChange,

    #[error("Patch produces an invalid element: {0}")]
    InvalidPatch(String),
}
