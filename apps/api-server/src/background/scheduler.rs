//! Cron-style job scheduler for periodic maintenance.

use std::future::Future;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

/// Thin wrapper over [`JobScheduler`] that can be switched off by config.
///
/// A disabled scheduler accepts registrations but never runs them.
pub struct Scheduler {
    inner: JobScheduler,
    enabled: bool,
    running: bool,
}

impl Scheduler {
    pub async fn new(enabled: bool) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self {
            inner,
            enabled,
            running: false,
        })
    }

    /// Register a job on a six-field (seconds first) cron schedule.
    pub async fn add_cron<F, Fut>(&self, schedule: &str, task: F) -> Result<Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_id, _lock| {
            let task = task.clone();
            Box::pin(async move { task().await })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    pub async fn start(&mut self) -> Result<(), JobSchedulerError> {
        if !self.enabled {
            tracing::info!("Scheduler disabled, maintenance jobs will not run");
            return Ok(());
        }

        self.inner.start().await?;
        self.running = true;
        tracing::info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        if !self.running {
            return Ok(());
        }

        self.inner.shutdown().await?;
        self.running = false;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}
