//! Error types for the design model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Design document has no pages")]
    EmptyDocument,
}
