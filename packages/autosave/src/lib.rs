//! # Customfly Autosave
//!
//! Quiet-period persistence for designs.
//!
//! A change marks the design dirty and (re)starts a quiet period. When it
//! elapses the latest document is sent to a [`DesignStore`], which answers
//! with the design's canonical id; every later save carries that id.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use customfly_autosave::{AutosaveConfig, AutosaveScheduler, Designer, MemoryStore};
//! use customfly_editor::{EditSession, Mutation, SessionConfig};
//! use customfly_model::CanvasElement;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), customfly_autosave::AutosaveError> {
//! let store = Arc::new(MemoryStore::new());
//! let autosave = AutosaveScheduler::spawn(store, &AutosaveConfig::default(), None);
//! let mut designer = Designer::new(EditSession::new(Vec::new(), SessionConfig::default()), autosave, "Mug");
//!
//! designer.apply(Mutation::AddElement { element: CanvasElement::text("t1", "Hi") });
//! let status = designer.save_now().await?;
//! assert_eq!(status.design_id.as_deref(), Some("1001"));
//! # Ok(())
//! # }
//! ```

mod config;
mod designer;
mod fingerprint;
mod machine;
mod scheduler;
mod store;

pub use config::{AutosaveConfig, DEFAULT_QUIET_PERIOD_SECS};
pub use designer::Designer;
pub use fingerprint::fingerprint;
pub use machine::{AutosaveMachine, AutosaveStatus, DesignPayload, Due, SaveJob, SaveStatus};
pub use scheduler::{AutosaveError, AutosaveHandle, AutosaveScheduler};
pub use store::{DesignStore, MemoryStore, SaveError, SaveRequest, SaveResponse, FIRST_MEMORY_ID};
