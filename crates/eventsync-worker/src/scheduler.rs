//! Cron scheduler for the reconciliation sweep.

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use eventsync_core::error::AppError;

use crate::reconcile::Reconciler;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Run `reconciler` on the given cron expression (six fields, with seconds).
    pub async fn register_reconcile(
        &self,
        cron: &str,
        reconciler: Reconciler,
    ) -> Result<(), AppError> {
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let reconciler = reconciler.clone();
            Box::pin(async move {
                tracing::debug!("Starting scheduled reconciliation");
                if let Err(e) = reconciler.run_once().await {
                    tracing::error!(error = %e, "Reconciliation sweep failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid reconcile schedule '{cron}': {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add reconcile schedule: {e}"))
        })?;

        tracing::info!(cron, "Registered: reconcile");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
