//! Integration tests for the Postgres job queue's idempotency handling.

mod common;

use serde_json::json;
use test_context::test_context;
use uuid::Uuid;

use common::harness::TestHarness;

use server_core::kernel::jobs::{JobPriority, JobQueue, PostgresJobQueue};

/// Insert a live (running, leased) job row carrying an idempotency key.
async fn seed_running_job(
    pool: &sqlx::PgPool,
    job_type: &str,
    key: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO jobs (
            id, status, job_type, args, idempotency_key,
            lease_expires_at, next_run_at, created_at, updated_at
        )
        VALUES ($1, 'running', $2, $3, $4,
                NOW() + INTERVAL '10 minutes', NOW(), NOW(), NOW())
        "#,
    )
    .bind(id)
    .bind(job_type)
    .bind(json!({"target_type": "post", "target_id": 999_999_999, "content": "x"}))
    .bind(key)
    .execute(pool)
    .await
    .unwrap();
    id
}

#[test_context(TestHarness)]
#[tokio::test]
async fn enqueue_with_live_idempotency_key_is_a_duplicate(ctx: &mut TestHarness) {
    let queue = PostgresJobQueue::new(ctx.db_pool.clone());
    let key = format!("moderate:{}", Uuid::new_v4());

    let existing = seed_running_job(&ctx.db_pool, "moderate_content", &key).await;

    let result = queue
        .enqueue_raw(
            "moderate_content",
            json!({"target_type": "post", "target_id": 999_999_999, "content": "x"}),
            Some(key.clone()),
            JobPriority::Normal,
            0,
            None,
        )
        .await
        .unwrap();

    assert!(!result.is_created());
    assert_eq!(result.job_id(), existing);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn finished_job_no_longer_blocks_its_idempotency_key(ctx: &mut TestHarness) {
    let queue = PostgresJobQueue::new(ctx.db_pool.clone());
    let key = format!("moderate:{}", Uuid::new_v4());

    let finished = seed_running_job(&ctx.db_pool, "moderate_content", &key).await;
    sqlx::query("UPDATE jobs SET status = 'succeeded', lease_expires_at = NULL WHERE id = $1")
        .bind(finished)
        .execute(&ctx.db_pool)
        .await
        .unwrap();

    // Only pending/running rows count as live; a finished run frees the key.
    let result = queue
        .enqueue_raw(
            "moderate_content",
            json!({"target_type": "post", "target_id": 999_999_999, "content": "x"}),
            Some(key),
            JobPriority::Normal,
            0,
            None,
        )
        .await
        .unwrap();

    assert!(result.is_created());
    assert_ne!(result.job_id(), finished);
}
