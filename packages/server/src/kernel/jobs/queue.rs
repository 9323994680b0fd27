//! PostgreSQL-backed job queue.
//!
//! Commands are serialized to JSON and stored as rows in the `jobs`
//! table. Workers claim ready rows with `FOR UPDATE SKIP LOCKED`, so any
//! number of runner processes can share one queue safely.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::job::{ErrorKind, Job, JobPriority};

/// Result type for enqueue operations that handles idempotency.
#[derive(Debug, Clone)]
pub enum EnqueueResult {
    /// Command was enqueued, returns new job ID
    Created(Uuid),
    /// Command already exists (idempotency hit), returns existing job ID
    Duplicate(Uuid),
}

impl EnqueueResult {
    /// Get the job ID regardless of whether it was created or duplicate
    pub fn job_id(&self) -> Uuid {
        match self {
            EnqueueResult::Created(id) | EnqueueResult::Duplicate(id) => *id,
        }
    }

    /// Returns true if this was a newly created job
    pub fn is_created(&self) -> bool {
        matches!(self, EnqueueResult::Created(_))
    }
}

/// A claimed job ready for execution.
#[derive(Debug)]
pub struct ClaimedJob {
    /// The job ID
    pub id: Uuid,
    /// The raw job record
    pub job: Job,
}

impl ClaimedJob {
    /// Deserialize the command payload.
    pub fn deserialize<C: DeserializeOwned>(&self) -> Result<C> {
        let args = self
            .job
            .args
            .as_ref()
            .ok_or_else(|| anyhow!("job {} has no args", self.id))?;
        serde_json::from_value(args.clone())
            .map_err(|e| anyhow!("failed to deserialize command: {}", e))
    }

    /// Get the command type (job_type)
    pub fn command_type(&self) -> &str {
        &self.job.job_type
    }
}

/// Metadata for command serialization.
///
/// Commands implement this trait to provide their job type plus optional
/// queueing behavior overrides.
pub trait CommandMeta {
    /// The command type name (used as job_type).
    fn command_type(&self) -> &'static str;

    /// Optional idempotency key.
    ///
    /// If provided, ensures only one pending/running job exists with this key.
    fn idempotency_key(&self) -> Option<String> {
        None
    }

    /// Optional priority override.
    fn priority(&self) -> JobPriority {
        JobPriority::Normal
    }

    /// Optional reference ID for the job.
    fn reference_id(&self) -> Option<Uuid> {
        None
    }

    /// Maximum retries for this command.
    fn max_retries(&self) -> i32 {
        3
    }
}

/// Trait for job queue operations.
///
/// Object-safe; use [`JobQueueExt::enqueue`] for typed enqueueing.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a serialized command for immediate execution.
    async fn enqueue_raw(
        &self,
        job_type: &'static str,
        payload: serde_json::Value,
        idempotency_key: Option<String>,
        priority: JobPriority,
        max_retries: i32,
        reference_id: Option<Uuid>,
    ) -> Result<EnqueueResult>;

    /// Claim up to `limit` jobs for processing.
    ///
    /// Uses `FOR UPDATE SKIP LOCKED` for concurrent-safe claiming and
    /// also reclaims running jobs whose lease has expired.
    async fn claim(&self, worker_id: &str, limit: i64) -> Result<Vec<ClaimedJob>>;

    /// Mark a job as successfully completed.
    async fn mark_succeeded(&self, job_id: Uuid) -> Result<()>;

    /// Mark a job as failed with an error.
    ///
    /// If the error is retryable and retries remain, the job is
    /// re-queued with exponential backoff. Otherwise it stays failed.
    async fn mark_failed(&self, job_id: Uuid, error: &str, kind: ErrorKind) -> Result<()>;
}

/// Typed enqueue convenience over any [`JobQueue`].
#[async_trait]
pub trait JobQueueExt: JobQueue {
    /// Serialize a command and enqueue it under its declared job type.
    async fn enqueue<C>(&self, command: C) -> Result<EnqueueResult>
    where
        C: Serialize + CommandMeta + Send + Sync,
    {
        let payload = serde_json::to_value(&command)
            .map_err(|e| anyhow!("failed to serialize {}: {}", command.command_type(), e))?;

        self.enqueue_raw(
            command.command_type(),
            payload,
            command.idempotency_key(),
            command.priority(),
            command.max_retries(),
            command.reference_id(),
        )
        .await
    }
}

impl<T: JobQueue + ?Sized> JobQueueExt for T {}

/// PostgreSQL-backed job queue implementation.
pub struct PostgresJobQueue {
    pool: PgPool,
    lease: Duration,
}

impl PostgresJobQueue {
    /// Create a new queue with the default one-minute claim lease.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lease: Duration::from_secs(60),
        }
    }

    /// Create with a custom lease duration.
    pub fn with_lease(pool: PgPool, lease: Duration) -> Self {
        Self { pool, lease }
    }

    /// Check if a live job with the given idempotency key already exists.
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT *
            FROM jobs
            WHERE idempotency_key = $1
              AND status IN ('pending', 'running')
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }
}

#[async_trait]
impl JobQueue for PostgresJobQueue {
    async fn enqueue_raw(
        &self,
        job_type: &'static str,
        payload: serde_json::Value,
        idempotency_key: Option<String>,
        priority: JobPriority,
        max_retries: i32,
        reference_id: Option<Uuid>,
    ) -> Result<EnqueueResult> {
        // Check idempotency first
        if let Some(key) = &idempotency_key {
            if let Some(existing) = self.find_by_idempotency_key(key).await? {
                tracing::debug!(
                    job_id = %existing.id,
                    idempotency_key = %key,
                    "found existing job with idempotency key"
                );
                return Ok(EnqueueResult::Duplicate(existing.id));
            }
        }

        let job = Job::for_command(
            job_type,
            payload,
            reference_id,
            idempotency_key,
            priority,
            max_retries,
        );
        let inserted = job.insert(&self.pool).await?;

        tracing::debug!(job_id = %inserted.id, job_type = %job_type, "enqueued job");

        Ok(EnqueueResult::Created(inserted.id))
    }

    async fn claim(&self, worker_id: &str, limit: i64) -> Result<Vec<ClaimedJob>> {
        let lease_ms = self.lease.as_millis() as i64;

        let jobs = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'running',
                worker_id = $1,
                lease_expires_at = NOW() + ($2 * INTERVAL '1 millisecond'),
                last_run_at = NOW(),
                updated_at = NOW()
            WHERE id IN (
                SELECT id
                FROM jobs
                WHERE (status = 'pending' AND (next_run_at IS NULL OR next_run_at <= NOW()))
                   OR (status = 'running' AND lease_expires_at < NOW())
                ORDER BY priority ASC, next_run_at ASC NULLS FIRST
                FOR UPDATE SKIP LOCKED
                LIMIT $3
            )
            RETURNING *
            "#,
        )
        .bind(worker_id)
        .bind(lease_ms)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs
            .into_iter()
            .map(|job| ClaimedJob { id: job.id, job })
            .collect())
    }

    async fn mark_succeeded(&self, job_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'succeeded',
                worker_id = NULL,
                lease_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str, kind: ErrorKind) -> Result<()> {
        let job = Job::find_by_id(job_id, &self.pool).await?;

        if kind.should_retry() && job.retry_count < job.max_retries {
            // Re-queue with exponential backoff, capped at one hour.
            let delay_secs = (30 * 2i64.pow(job.retry_count as u32)).min(3600);
            let retry_at = Utc::now() + chrono::Duration::seconds(delay_secs);

            sqlx::query(
                r#"
                UPDATE jobs
                SET status = 'pending',
                    retry_count = retry_count + 1,
                    next_run_at = $1,
                    error_message = $2,
                    error_kind = $3,
                    worker_id = NULL,
                    lease_expires_at = NULL,
                    updated_at = NOW()
                WHERE id = $4
                "#,
            )
            .bind(retry_at)
            .bind(error)
            .bind(kind)
            .bind(job_id)
            .execute(&self.pool)
            .await?;

            tracing::debug!(job_id = %job_id, retry_at = %retry_at, "scheduled job retry");
        } else {
            sqlx::query(
                r#"
                UPDATE jobs
                SET status = 'failed',
                    error_message = $1,
                    error_kind = $2,
                    worker_id = NULL,
                    lease_expires_at = NULL,
                    updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(error)
            .bind(kind)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}
