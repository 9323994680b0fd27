//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use sqlx::PgPool;

use server_core::domains::moderation::ModerationStatus;
use server_core::domains::posts::{Comment, Post};

/// Create a post (moderation status starts at pending).
pub async fn create_post(pool: &PgPool, title: &str, content: &str) -> Result<Post> {
    Post::create(pool, title, content).await
}

/// Create a comment under a post.
pub async fn create_comment(pool: &PgPool, post_id: i64, content: &str) -> Result<Comment> {
    Comment::create(pool, post_id, Some("tester"), content).await
}

/// Force a post into a given moderation state, bypassing the pipeline.
pub async fn set_post_status(
    pool: &PgPool,
    post_id: i64,
    status: ModerationStatus,
    reason: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE posts SET moderation_status = $1, moderation_reason = $2 WHERE id = $3")
        .bind(status)
        .bind(reason)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch a post's moderation state.
pub async fn post_moderation(
    pool: &PgPool,
    post_id: i64,
) -> Result<(ModerationStatus, Option<String>)> {
    let row: (ModerationStatus, Option<String>) = sqlx::query_as(
        "SELECT moderation_status, moderation_reason FROM posts WHERE id = $1",
    )
    .bind(post_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Fetch a comment's moderation state.
pub async fn comment_moderation(
    pool: &PgPool,
    comment_id: i64,
) -> Result<(ModerationStatus, Option<String>)> {
    let row: (ModerationStatus, Option<String>) = sqlx::query_as(
        "SELECT moderation_status, moderation_reason FROM comments WHERE id = $1",
    )
    .bind(comment_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
