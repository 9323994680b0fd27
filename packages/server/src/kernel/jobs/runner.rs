//! Job runner service for processing background jobs.
//!
//! The `JobRunner` polls the queue for ready jobs, executes them via the
//! registry, and records the outcome. Retries are handled by the queue's
//! `mark_failed`. Any number of runners may poll the same queue; claims
//! use `FOR UPDATE SKIP LOCKED` so they never collide.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::job::ErrorKind;
use super::queue::JobQueue;
use super::registry::SharedJobRegistry;
use crate::kernel::ServerDeps;

/// Configuration for the job runner.
#[derive(Debug, Clone)]
pub struct JobRunnerConfig {
    /// Maximum number of jobs to claim at once
    pub batch_size: i64,
    /// How long to wait when no jobs are available
    pub poll_interval: Duration,
    /// Worker ID for this instance
    pub worker_id: String,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            poll_interval: Duration::from_secs(5),
            worker_id: format!("runner-{}", Uuid::new_v4()),
        }
    }
}

/// Background service that processes jobs from the queue.
pub struct JobRunner {
    job_queue: Arc<dyn JobQueue>,
    registry: SharedJobRegistry,
    deps: Arc<ServerDeps>,
    config: JobRunnerConfig,
    shutdown: Arc<AtomicBool>,
}

impl JobRunner {
    /// Create a new job runner with default configuration.
    pub fn new(
        job_queue: Arc<dyn JobQueue>,
        registry: SharedJobRegistry,
        deps: Arc<ServerDeps>,
    ) -> Self {
        Self::with_config(job_queue, registry, deps, JobRunnerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(
        job_queue: Arc<dyn JobQueue>,
        registry: SharedJobRegistry,
        deps: Arc<ServerDeps>,
        config: JobRunnerConfig,
    ) -> Self {
        Self {
            job_queue,
            registry,
            deps,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a shutdown handle for graceful shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Claim and execute one batch of ready jobs.
    ///
    /// Returns the number of jobs executed. Exposed so tests and the
    /// standalone worker can drive the queue without the sleep loop.
    pub async fn poll_once(&self) -> Result<usize> {
        let jobs = self
            .job_queue
            .claim(&self.config.worker_id, self.config.batch_size)
            .await?;

        let count = jobs.len();
        if count > 0 {
            debug!(count, "claimed jobs");
        }

        for job in jobs {
            let job_id = job.id;
            let job_type = job.command_type().to_string();

            debug!(job_id = %job_id, job_type = %job_type, "executing job");

            match self.registry.execute(&job, self.deps.clone()).await {
                Ok(()) => {
                    info!(job_id = %job_id, job_type = %job_type, "job succeeded");
                    if let Err(e) = self.job_queue.mark_succeeded(job_id).await {
                        error!(job_id = %job_id, error = %e, "failed to mark job as succeeded");
                    }
                }
                Err(e) => {
                    warn!(job_id = %job_id, job_type = %job_type, error = %e, "job failed");

                    let kind = classify_error(&e);
                    if let Err(mark_err) =
                        self.job_queue.mark_failed(job_id, &e.to_string(), kind).await
                    {
                        error!(job_id = %job_id, error = %mark_err, "failed to mark job as failed");
                    }
                }
            }
        }

        Ok(count)
    }

    /// Run the job runner until shutdown is requested.
    pub async fn run(self) -> Result<()> {
        info!(
            worker_id = %self.config.worker_id,
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "job runner starting"
        );

        loop {
            if self.is_shutdown_requested() {
                break;
            }

            match self.poll_once().await {
                Ok(0) => tokio::time::sleep(self.config.poll_interval).await,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "failed to claim jobs");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        info!(worker_id = %self.config.worker_id, "job runner stopped");
        Ok(())
    }

    /// Run until a Ctrl+C shutdown signal is received.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let shutdown = self.shutdown_handle();

        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
            shutdown.store(true, Ordering::SeqCst);
        });

        self.run().await
    }
}

/// Classify an error to determine retry behavior.
fn classify_error(error: &anyhow::Error) -> ErrorKind {
    let error_str = error.to_string().to_lowercase();

    // Payload problems never fix themselves on retry.
    if error_str.contains("deserialize") || error_str.contains("unknown job type") {
        return ErrorKind::NonRetryable;
    }

    ErrorKind::Retryable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = JobRunnerConfig::default();
        assert_eq!(config.batch_size, 10);
        assert!(config.worker_id.starts_with("runner-"));
    }

    #[test]
    fn classify_error_retryable() {
        let error = anyhow::anyhow!("connection timeout");
        assert_eq!(classify_error(&error), ErrorKind::Retryable);
    }

    #[test]
    fn classify_error_bad_payload() {
        let error = anyhow::anyhow!("failed to deserialize moderate_content: missing field");
        assert_eq!(classify_error(&error), ErrorKind::NonRetryable);
    }
}
