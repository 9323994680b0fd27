//! Job model for background command execution.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle of a job row. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

impl JobPriority {
    /// Convert to integer for efficient DB ordering (lower = higher priority)
    pub fn as_i16(&self) -> i16 {
        match self {
            JobPriority::Critical => 0,
            JobPriority::High => 1,
            JobPriority::Normal => 2,
            JobPriority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transient error - will retry if attempts remain
    #[default]
    Retryable,
    /// Permanent error - will not retry
    NonRetryable,
}

impl ErrorKind {
    /// Whether this error kind should trigger a retry
    pub fn should_retry(&self) -> bool {
        matches!(self, ErrorKind::Retryable)
    }
}

// ============================================================================
// Job Model
// ============================================================================

/// One row in the `jobs` table.
#[derive(FromRow, Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub job_type: String,
    pub args: Option<serde_json::Value>,
    /// Integer priority, see [`JobPriority::as_i16`].
    pub priority: i16,
    pub max_retries: i32,
    pub retry_count: i32,
    pub idempotency_key: Option<String>,
    pub reference_id: Option<Uuid>,
    pub worker_id: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a one-time job ready to run immediately.
    pub fn for_command(
        job_type: &str,
        args: serde_json::Value,
        reference_id: Option<Uuid>,
        idempotency_key: Option<String>,
        priority: JobPriority,
        max_retries: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            job_type: job_type.to_string(),
            args: Some(args),
            priority: priority.as_i16(),
            max_retries,
            retry_count: 0,
            idempotency_key,
            reference_id,
            worker_id: None,
            lease_expires_at: None,
            next_run_at: Some(now),
            last_run_at: None,
            error_message: None,
            error_kind: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Insert the job into the database.
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (
                id, status, job_type, args, priority, max_retries, retry_count,
                idempotency_key, reference_id, next_run_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.status)
        .bind(&self.job_type)
        .bind(&self.args)
        .bind(self.priority)
        .bind(self.max_retries)
        .bind(self.retry_count)
        .bind(&self.idempotency_key)
        .bind(self.reference_id)
        .bind(self.next_run_at)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(pool)
        .await?;

        Ok(job)
    }

    /// Fetch a job by id.
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_lowest_first() {
        assert!(JobPriority::Critical.as_i16() < JobPriority::High.as_i16());
        assert!(JobPriority::High.as_i16() < JobPriority::Normal.as_i16());
        assert!(JobPriority::Normal.as_i16() < JobPriority::Low.as_i16());
    }

    #[test]
    fn non_retryable_errors_do_not_retry() {
        assert!(ErrorKind::Retryable.should_retry());
        assert!(!ErrorKind::NonRetryable.should_retry());
    }
}
