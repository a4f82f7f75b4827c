//! # Autosave Scheduler
//!
//! Drives an [`AutosaveMachine`] from a single tokio task.
//!
//! ```text
//! AutosaveHandle ──mpsc──▶ task ──▶ DesignStore::save
//!        ▲                  │
//!        └──────watch───────┘  AutosaveStatus
//! ```
//!
//! The task selects over three sources: handle commands, the quiet-period
//! deadline, and the save in flight. The deadline branch is disabled while
//! a save runs, so saves never overlap; changes keep arriving meanwhile.

use crate::config::AutosaveConfig;
use crate::machine::{AutosaveMachine, AutosaveStatus, DesignPayload, Due, SaveJob};
use crate::store::{DesignStore, SaveError, SaveResponse};
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Error)]
pub enum AutosaveError {
    #[error("Autosave task has stopped")]
    Closed,

    #[error("Autosave task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

enum Command {
    Change(DesignPayload),
    SaveNow,
    Flush(oneshot::Sender<AutosaveStatus>),
    Shutdown,
}

pub struct AutosaveScheduler;

impl AutosaveScheduler {
    /// Spawn the scheduler task. Must be called within a tokio runtime.
    pub fn spawn(store: Arc<dyn DesignStore>, config: &AutosaveConfig, design_id: Option<String>) -> AutosaveHandle {
        let machine = AutosaveMachine::new(config.quiet_period(), design_id);
        let (status_tx, status_rx) = watch::channel(machine.snapshot());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(machine, store, command_rx, status_tx));

        AutosaveHandle {
            commands: command_tx,
            status: status_rx,
            task,
        }
    }
}

/// Owner side of a running scheduler. Dropping it stops the task.
pub struct AutosaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<AutosaveStatus>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    /// Report the document as changed
    pub fn record_change(&self, payload: DesignPayload) {
        self.send(Command::Change(payload));
    }

    /// Save unsaved changes now instead of after the quiet period
    pub fn request_save(&self) {
        self.send(Command::SaveNow);
    }

    /// Save unsaved changes now and wait until the scheduler settles
    pub async fn flush(&self) -> Result<AutosaveStatus, AutosaveError> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(Command::Flush(tx)).map_err(|_| AutosaveError::Closed)?;
        rx.await.map_err(|_| AutosaveError::Closed)
    }

    pub fn status(&self) -> AutosaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// Stop the scheduler. No new save starts; one already running is
    /// allowed to finish.
    pub async fn shutdown(self) -> Result<AutosaveStatus, AutosaveError> {
        let _ = self.commands.send(Command::Shutdown);
        self.task.await?;
        let status = self.status.borrow().clone();
        Ok(status)
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("autosave task already stopped");
        }
    }
}

type InFlight = BoxFuture<'static, Result<SaveResponse, SaveError>>;

async fn run(
    mut machine: AutosaveMachine,
    store: Arc<dyn DesignStore>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<AutosaveStatus>,
) {
    let mut in_flight: Option<(SaveJob, InFlight)> = None;
    let mut flush_waiters: Vec<oneshot::Sender<AutosaveStatus>> = Vec::new();

    loop {
        let deadline = machine.deadline();

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Change(payload)) => machine.record_change(payload, Instant::now()),
                Some(Command::SaveNow) => machine.request_save(Instant::now()),
                Some(Command::Flush(waiter)) => {
                    machine.request_save(Instant::now());
                    flush_waiters.push(waiter);
                }
                Some(Command::Shutdown) | None => break,
            },

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() && in_flight.is_none() => {
                if let Some(Due::Save(job)) = machine.poll_due(Instant::now()) {
                    let store = Arc::clone(&store);
                    let request = job.request.clone();
                    tracing::debug!(revision = job.revision, design_id = ?request.id, "autosave starting");
                    let save: InFlight = Box::pin(async move { store.save(request).await });
                    in_flight = Some((job, save));
                }
            },

            result = async {
                match in_flight.as_mut() {
                    Some((_, save)) => save.await,
                    None => std::future::pending().await,
                }
            }, if in_flight.is_some() => {
                if let Some((job, _)) = in_flight.take() {
                    finish(&mut machine, &job, result);
                }
            },
        }

        let _ = status.send(machine.snapshot());

        if in_flight.is_none() && machine.deadline().is_none() {
            for waiter in flush_waiters.drain(..) {
                let _ = waiter.send(machine.snapshot());
            }
        }
    }

    // Teardown: the timer is gone; let a running save land
    if let Some((job, save)) = in_flight.take() {
        let result = save.await;
        finish(&mut machine, &job, result);
    }
    let snapshot = machine.snapshot();
    for waiter in flush_waiters.drain(..) {
        let _ = waiter.send(snapshot.clone());
    }
    let _ = status.send(snapshot);
    tracing::debug!("autosave stopped");
}

fn finish(machine: &mut AutosaveMachine, job: &SaveJob, result: Result<SaveResponse, SaveError>) {
    match result {
        Ok(response) => machine.save_succeeded(job, response, chrono::Utc::now()),
        Err(e) => machine.save_failed(e.to_string()),
    }
}
