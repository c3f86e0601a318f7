//! Background scan control: at most one scan at a time, started and stopped
//! on request, with a status snapshot for front ends.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::scan::{ScanOrchestrator, ScanOutcome, ScanScope};
use crate::domain::events::ScanEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    #[default]
    Idle,
    Scanning,
    /// Stop requested; the worker has not reached a cancellation point yet.
    Stopping,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStatus {
    pub phase: ScanPhase,
    pub scope: Option<ScanScope>,
    pub current_show: Option<String>,
    pub current_episode: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<ScanOutcome>,
}

#[derive(Default)]
struct Running {
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

pub struct ScanController {
    orchestrator: Arc<ScanOrchestrator>,
    status: Arc<RwLock<ScanStatus>>,
    running: Arc<Mutex<Running>>,
    events: broadcast::Sender<ScanEvent>,
}

impl ScanController {
    /// `status` must be the same handle the orchestrator reports progress to.
    pub fn new(
        orchestrator: ScanOrchestrator,
        status: Arc<RwLock<ScanStatus>>,
        events: broadcast::Sender<ScanEvent>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            status,
            running: Arc::new(Mutex::new(Running::default())),
            events,
        }
    }

    pub async fn status(&self) -> ScanStatus {
        self.status.read().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.status.read().await.phase != ScanPhase::Idle
    }

    /// Starts a scan on a background task. Returns `false` without doing
    /// anything when a scan is already active.
    pub async fn start(&self, scope: ScanScope) -> bool {
        let mut status = self.status.write().await;
        if status.phase != ScanPhase::Idle {
            info!(phase = ?status.phase, "Scan already active, ignoring start request");
            return false;
        }

        *status = ScanStatus {
            phase: ScanPhase::Scanning,
            scope: Some(scope),
            started_at: Some(Utc::now()),
            last_outcome: status.last_outcome,
            ..ScanStatus::default()
        };

        let token = CancellationToken::new();
        let orchestrator = Arc::clone(&self.orchestrator);
        let status_handle = Arc::clone(&self.status);
        let running_handle = Arc::clone(&self.running);
        let worker_token = token.clone();

        let mut running = self.running.lock().await;
        running.token = Some(token);
        running.handle = Some(tokio::spawn(async move {
            let outcome = orchestrator.run(scope, &worker_token).await;

            // Cleared under the status lock so a new start cannot interleave.
            let mut status = status_handle.write().await;
            running_handle.lock().await.token = None;
            status.phase = ScanPhase::Idle;
            status.current_show = None;
            status.current_episode = None;
            status.finished_at = Some(Utc::now());
            status.last_outcome = Some(outcome);
        }));
        drop(running);
        drop(status);

        true
    }

    /// Requests cooperative cancellation of the active scan. Returns `false`
    /// when nothing is running.
    pub async fn stop(&self) -> bool {
        let mut status = self.status.write().await;
        if status.phase != ScanPhase::Scanning {
            return false;
        }
        status.phase = ScanPhase::Stopping;
        drop(status);

        if let Some(token) = &self.running.lock().await.token {
            token.cancel();
        }
        info!(event = "scan_stop_requested", "Scan stop requested");
        let _ = self.events.send(ScanEvent::StopRequested);
        true
    }

    /// Stops any active scan and waits for the worker to exit.
    pub async fn shutdown(&self) {
        self.stop().await;
        let handle = self.running.lock().await.handle.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(error = %e, "Scan worker panicked");
        }
    }

    /// Waits for the current scan, if any, to finish on its own.
    pub async fn wait(&self) {
        let handle = self.running.lock().await.handle.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            error!(error = %e, "Scan worker panicked");
        }
    }
}
