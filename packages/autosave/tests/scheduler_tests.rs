//! Scheduler timing against a paused tokio clock

use customfly_autosave::{
    AutosaveConfig, AutosaveScheduler, DesignPayload, MemoryStore, SaveStatus,
};
use customfly_model::{default_pages, CanvasElement};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn payload(revision: u64) -> DesignPayload {
    let mut pages = default_pages();
    for i in 0..revision {
        pages[0].elements.push(CanvasElement::text(format!("el{}", i), "x"));
    }
    DesignPayload {
        revision,
        name: "Mug".to_string(),
        pages,
        config: Value::Null,
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[tokio::test(start_paused = true)]
async fn test_no_save_before_quiet_period() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(29)).await;

    assert!(store.requests().is_empty());
    assert_eq!(handle.status().status, SaveStatus::Dirty);
}

#[tokio::test(start_paused = true)]
async fn test_saves_once_after_quiet_period() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(31)).await;

    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].design_json, payload(1).pages);

    let status = handle.status();
    assert_eq!(status.status, SaveStatus::Idle);
    assert_eq!(status.saved_revision, Some(1));
    assert!(status.last_saved_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_changes_restart_the_timer() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(20)).await;
    handle.record_change(payload(2));
    sleep(secs(25)).await;
    assert!(store.requests().is_empty());

    sleep(secs(6)).await;
    let requests = store.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].design_json, payload(2).pages);
}

#[tokio::test(start_paused = true)]
async fn test_id_promotion() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(31)).await;
    handle.record_change(payload(2));
    sleep(secs(31)).await;

    let requests = store.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].id, None);
    assert_eq!(requests[1].id.as_deref(), Some("1001"));
    assert_eq!(handle.status().design_id.as_deref(), Some("1001"));
    assert_eq!(store.design_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_saves_never_overlap() {
    let store = Arc::new(MemoryStore::new().with_latency(secs(10)));
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(31)).await;
    assert_eq!(handle.status().status, SaveStatus::Saving);

    // Changed and due while the first save is still running
    handle.record_change(payload(2));
    handle.request_save();
    sleep(secs(5)).await;
    assert_eq!(store.requests().len(), 1);

    sleep(secs(20)).await;
    let requests = store.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].id.as_deref(), Some("1001"));
    assert_eq!(store.max_in_flight(), 1);
    assert_eq!(handle.status().status, SaveStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_reported_without_retry() {
    let store = Arc::new(MemoryStore::new());
    store.fail_next(1);
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(31)).await;

    let status = handle.status();
    assert_eq!(status.status, SaveStatus::Error);
    assert!(status.is_dirty);
    assert!(status.last_error.is_some());

    sleep(secs(300)).await;
    assert_eq!(store.requests().len(), 1);

    // The next change starts a new cycle
    handle.record_change(payload(2));
    sleep(secs(31)).await;
    assert_eq!(store.requests().len(), 2);
    assert_eq!(handle.status().status, SaveStatus::Idle);
    assert_eq!(handle.status().last_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_design_is_not_resent() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    sleep(secs(31)).await;

    let mut same = payload(1);
    same.revision = 7;
    handle.record_change(same);
    sleep(secs(31)).await;

    assert_eq!(store.requests().len(), 1);
    assert_eq!(handle.status().saved_revision, Some(7));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_save() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    let status = handle.shutdown().await.unwrap();
    assert!(status.is_dirty);

    sleep(secs(120)).await;
    assert!(store.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_scheduler() {
    let store = Arc::new(MemoryStore::new());
    let handle = AutosaveScheduler::spawn(store.clone(), &AutosaveConfig::default(), None);

    handle.record_change(payload(1));
    drop(handle);

    sleep(secs(120)).await;
    assert!(store.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_saves_immediately() {
    let store = Arc::new(MemoryStore::new());
    let config = AutosaveConfig {
        enabled: false,
        ..AutosaveConfig::default()
    };
    let handle = AutosaveScheduler::spawn(store.clone(), &config, Some("42".to_string()));

    handle.record_change(payload(1));
    sleep(secs(600)).await;
    assert!(store.requests().is_empty());

    let status = handle.flush().await.unwrap();
    assert_eq!(status.status, SaveStatus::Idle);
    assert_eq!(status.design_id.as_deref(), Some("42"));
    assert_eq!(store.requests()[0].id.as_deref(), Some("42"));
}
