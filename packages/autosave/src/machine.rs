//! # Autosave State Machine
//!
//! Pure bookkeeping for the scheduler. Time is passed in, nothing here
//! sleeps or spawns.
//!
//! ```text
//!            change                 deadline
//!   Idle ───────────▶ Dirty ───────────────────▶ Saving
//!    ▲                  ▲                          │
//!    │     ok, clean    │ ok, changed meanwhile    │
//!    ├──────────────────┼──────────────────────────┤
//!    │                  │ change                   │ failed
//!    │                Error ◀──────────────────────┘
//!    └── unchanged fingerprint (skipped) ◀── Dirty
//! ```

use crate::fingerprint::fingerprint;
use crate::store::{SaveRequest, SaveResponse};
use chrono::{DateTime, Utc};
use customfly_model::PageData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    Dirty,
    Saving,
    Error,
}

/// Document state handed to the scheduler after a change
#[derive(Debug, Clone, PartialEq)]
pub struct DesignPayload {
    /// Session revision this payload was taken at
    pub revision: u64,
    pub name: String,
    pub pages: Vec<PageData>,
    pub config: Value,
}

/// Published view of the scheduler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveStatus {
    pub status: SaveStatus,
    pub design_id: Option<String>,
    /// Unsaved changes exist
    pub is_dirty: bool,
    /// Revision of the last payload known to be persisted
    pub saved_revision: Option<u64>,
    pub last_error: Option<String>,
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// A save the driver should run now
#[derive(Debug, Clone, PartialEq)]
pub struct SaveJob {
    pub revision: u64,
    pub request: SaveRequest,
    fingerprint: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Due {
    Save(SaveJob),
    /// Content matches the last save; nothing to send
    Skipped { revision: u64 },
}

#[derive(Debug)]
pub struct AutosaveMachine {
    status: SaveStatus,
    design_id: Option<String>,
    quiet_period: Option<Duration>,

    /// Latest unsaved payload
    pending: Option<DesignPayload>,
    deadline: Option<Instant>,

    /// Payload of the save in flight, restored if it fails
    in_flight: Option<(DesignPayload, Option<u32>)>,

    last_saved_fingerprint: Option<u32>,
    saved_revision: Option<u64>,
    last_error: Option<String>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl AutosaveMachine {
    /// `quiet_period` of `None` disables the timer; saves then only happen
    /// on request
    pub fn new(quiet_period: Option<Duration>, design_id: Option<String>) -> Self {
        Self {
            status: SaveStatus::Idle,
            design_id,
            quiet_period,
            pending: None,
            deadline: None,
            in_flight: None,
            last_saved_fingerprint: None,
            saved_revision: None,
            last_error: None,
            last_saved_at: None,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn design_id(&self) -> Option<&str> {
        self.design_id.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.pending.is_some() || self.in_flight.is_some()
    }

    /// When the pending payload becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A change arrived: the quiet period restarts
    pub fn record_change(&mut self, payload: DesignPayload, now: Instant) {
        self.pending = Some(payload);
        if let Some(quiet) = self.quiet_period {
            self.deadline = Some(now + quiet);
        }
        if self.in_flight.is_none() {
            self.status = SaveStatus::Dirty;
        }
    }

    /// Make unsaved changes due immediately
    pub fn request_save(&mut self, now: Instant) {
        if self.pending.is_some() {
            self.deadline = Some(now);
        }
    }

    /// Take the due save, if the deadline passed and no save is running
    pub fn poll_due(&mut self, now: Instant) -> Option<Due> {
        if self.in_flight.is_some() {
            return None;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {}
            _ => return None,
        }
        self.deadline = None;
        let payload = self.pending.take()?;

        let fingerprint = match fingerprint(&payload.pages) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "could not fingerprint design");
                None
            }
        };

        if fingerprint.is_some() && fingerprint == self.last_saved_fingerprint {
            tracing::debug!(revision = payload.revision, "design unchanged since last save");
            self.saved_revision = Some(payload.revision);
            self.status = SaveStatus::Idle;
            return Some(Due::Skipped {
                revision: payload.revision,
            });
        }

        let request = SaveRequest {
            id: self.design_id.clone(),
            name: payload.name.clone(),
            design_json: payload.pages.clone(),
            config: payload.config.clone(),
        };
        let revision = payload.revision;
        self.in_flight = Some((payload, fingerprint));
        self.status = SaveStatus::Saving;

        Some(Due::Save(SaveJob {
            revision,
            request,
            fingerprint,
        }))
    }

    pub fn save_succeeded(&mut self, job: &SaveJob, response: SaveResponse, at: DateTime<Utc>) {
        self.in_flight = None;
        if self.design_id.as_deref() != Some(response.id.as_str()) {
            tracing::info!(
                previous = ?self.design_id,
                design_id = %response.id,
                "design id assigned by store"
            );
            self.design_id = Some(response.id);
        }
        self.last_saved_fingerprint = job.fingerprint;
        self.saved_revision = Some(job.revision);
        self.last_error = None;
        self.last_saved_at = Some(at);
        self.status = if self.pending.is_some() {
            SaveStatus::Dirty
        } else {
            SaveStatus::Idle
        };
        tracing::info!(revision = job.revision, design_id = ?self.design_id, "design saved");
    }

    /// The document stays dirty; nothing is retried until the next change
    /// or request
    pub fn save_failed(&mut self, message: String) {
        if let Some((payload, _)) = self.in_flight.take() {
            if self.pending.is_none() {
                self.pending = Some(payload);
            }
        }
        tracing::warn!(error = %message, "autosave failed");
        self.last_error = Some(message);
        self.status = SaveStatus::Error;
    }

    pub fn snapshot(&self) -> AutosaveStatus {
        AutosaveStatus {
            status: self.status,
            design_id: self.design_id.clone(),
            is_dirty: self.is_dirty(),
            saved_revision: self.saved_revision,
            last_error: self.last_error.clone(),
            last_saved_at: self.last_saved_at,
        }
    }
}
