use anyhow::Result;
use std::sync::Arc;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::scan::ScanScope;
use super::scanner::ScanController;
use crate::config::SchedulerConfig;

/// Starts a full scan periodically, either on a cron expression or on a
/// fixed interval. A tick that lands while a scan is running is skipped.
pub struct Scheduler {
    controller: Arc<ScanController>,
    config: SchedulerConfig,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(controller: Arc<ScanController>, config: SchedulerConfig) -> Self {
        Self {
            controller,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Runs until [`Scheduler::stop`] is called.
    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let controller = Arc::clone(&self.controller);
        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let controller = Arc::clone(&controller);
            Box::pin(async move {
                trigger_scan(&controller).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;
        info!("Scheduler running with cron: {}", cron_expr);

        self.shutdown.cancelled().await;

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.check_interval_minutes.max(1);
        info!("Scheduler running: Scan every {}m", interval_mins);

        let mut check_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                _ = check_interval.tick() => trigger_scan(&self.controller).await,
            }
        }

        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping scheduler...");
        self.shutdown.cancel();
    }
}

async fn trigger_scan(controller: &ScanController) {
    if controller.start(ScanScope::All).await {
        info!(event = "job_started", job_name = "scan_tracked_shows", "Started scheduled scan");
    } else {
        info!(
            event = "job_skipped",
            job_name = "scan_tracked_shows",
            "Scan already running, skipping scheduled scan"
        );
    }
}
