//! Design store contract and an in-memory implementation.

use async_trait::async_trait;
use customfly_model::PageData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// First id handed out by [`MemoryStore`]
pub const FIRST_MEMORY_ID: u64 = 1001;

/// Payload sent to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Canonical id, `None` until the first save succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub design_json: Vec<PageData>,
    /// Opaque editor configuration stored alongside the design
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Store rejected the design: {0}")]
    Rejected(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persists designs and assigns their canonical ids.
///
/// Saving again with a returned id must update that design, never create
/// another one.
#[async_trait]
pub trait DesignStore: Send + Sync {
    async fn save(&self, request: SaveRequest) -> Result<SaveResponse, SaveError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    designs: HashMap<String, SaveRequest>,
    requests: Vec<SaveRequest>,
    failures_pending: usize,
    in_flight: usize,
    max_in_flight: usize,
}

/// Store that keeps designs in memory. Ids are assigned from `1001`.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    latency: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: FIRST_MEMORY_ID,
                ..MemoryState::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Each save takes `latency` to resolve
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `count` saves fail
    pub fn fail_next(&self, count: usize) {
        self.lock().failures_pending = count;
    }

    /// Every request received, including failed ones
    pub fn requests(&self) -> Vec<SaveRequest> {
        self.lock().requests.clone()
    }

    pub fn design(&self, id: &str) -> Option<SaveRequest> {
        self.lock().designs.get(id).cloned()
    }

    pub fn design_count(&self) -> usize {
        self.lock().designs.len()
    }

    /// Highest number of saves observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves plain data behind
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DesignStore for MemoryStore {
    async fn save(&self, request: SaveRequest) -> Result<SaveResponse, SaveError> {
        {
            let mut state = self.lock();
            state.requests.push(request.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.lock();
        state.in_flight -= 1;

        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            return Err(SaveError::Unavailable("injected failure".to_string()));
        }

        let id = match &request.id {
            Some(id) => id.clone(),
            None => {
                let id = state.next_id.to_string();
                state.next_id += 1;
                id
            }
        };
        let name = request.name.clone();
        state.designs.insert(id.clone(), request);

        Ok(SaveResponse { id, name: Some(name) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: Option<&str>) -> SaveRequest {
        SaveRequest {
            id: id.map(String::from),
            name: "Mug".to_string(),
            design_json: customfly_model::default_pages(),
            config: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_1001() {
        let store = MemoryStore::new();
        assert_eq!(store.save(request(None)).await.unwrap().id, "1001");
        assert_eq!(store.save(request(None)).await.unwrap().id, "1002");
    }

    #[tokio::test]
    async fn test_repeated_id_updates_in_place() {
        let store = MemoryStore::new();
        let id = store.save(request(None)).await.unwrap().id;
        let again = store.save(request(Some(&id))).await.unwrap();

        assert_eq!(again.id, id);
        assert_eq!(store.design_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new();
        store.fail_next(1);

        assert!(matches!(store.save(request(None)).await, Err(SaveError::Unavailable(_))));
        assert!(store.save(request(None)).await.is_ok());
        assert_eq!(store.requests().len(), 2);
    }

    #[test]
    fn test_request_wire_format() {
        let value = serde_json::to_value(request(None)).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["designJson"][0]["name"], "Side 1");
    }
}
