//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use docvault_core::config::WorkerConfig;
use docvault_core::error::AppError;

use crate::sweep::OrphanSweeper;

/// Cron-based scheduler for periodic background tasks.
pub struct WorkerScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Worker configuration.
    config: WorkerConfig,
}

impl std::fmt::Debug for WorkerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl WorkerScheduler {
    /// Creates a new scheduler.
    pub async fn new(config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, config })
    }

    /// Registers the orphan sweep on its configured cron schedule.
    pub async fn register_orphan_sweep(&self, sweeper: Arc<OrphanSweeper>) -> Result<(), AppError> {
        let schedule = self.config.sweep_schedule.clone();
        let job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                if let Err(e) = sweeper.sweep().await {
                    error!(error = %e, "Orphan sweep failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid sweep schedule '{schedule}': {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        info!(schedule = %schedule, "Registered: orphan sweep");
        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Worker scheduler started");
        Ok(())
    }

    /// Shuts the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Worker scheduler shut down");
        Ok(())
    }
}
