//! Post and comment row models.
//!
//! Both tables carry the same moderation columns; for the pipeline they
//! are interchangeable targets, distinguished only by
//! [`TargetType`](crate::domains::moderation::TargetType).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domains::moderation::ModerationStatus;

/// One row in `posts`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub likes: i32,
    pub views: i32,
    pub moderation_status: ModerationStatus,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Insert a new post. Moderation starts at `pending`.
    pub async fn create(pool: &PgPool, title: &str, content: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(post)
    }

    /// Newest-first feed, with hidden posts suppressed entirely.
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT *
            FROM posts
            WHERE moderation_status <> $1
            ORDER BY id DESC
            "#,
        )
        .bind(ModerationStatus::Hidden)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(post)
    }

    /// Increment the view counter and return the updated row.
    pub async fn bump_views(pool: &PgPool, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET views = views + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Adjust the like counter by `delta`, clamped at zero.
    pub async fn adjust_likes(pool: &PgPool, id: i64, delta: i32) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET likes = GREATEST(likes + $2, 0)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Update title and content. The edit re-enters the moderation
    /// pipeline: status resets to `pending` and the old reason is
    /// cleared.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                moderation_status = $4,
                moderation_reason = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(ModerationStatus::Pending)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Delete a post (comments cascade). Returns false when the post
    /// did not exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Writer recorded when a comment arrives without one. Placeholder
/// until accounts exist; with login this comes from the session.
pub const DEFAULT_COMMENT_WRITER: &str = "더미 작성자 1";

/// One row in `comments`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub writer: Option<String>,
    pub content: String,
    pub moderation_status: ModerationStatus,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Insert a new comment. Moderation starts at `pending`; a missing
    /// writer falls back to [`DEFAULT_COMMENT_WRITER`].
    pub async fn create(
        pool: &PgPool,
        post_id: i64,
        writer: Option<&str>,
        content: &str,
    ) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, writer, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(writer.unwrap_or(DEFAULT_COMMENT_WRITER))
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    pub async fn list_for_post(pool: &PgPool, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = $1 ORDER BY id ASC",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await?;
        Ok(comments)
    }

    /// Update a comment's content; the edit resets moderation to
    /// `pending`, same as a post edit.
    pub async fn update_content(
        pool: &PgPool,
        post_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $3,
                moderation_status = $4,
                moderation_reason = NULL
            WHERE id = $2 AND post_id = $1
            RETURNING *
            "#,
        )
        .bind(post_id)
        .bind(comment_id)
        .bind(content)
        .bind(ModerationStatus::Pending)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Delete a comment. Returns false when it did not exist under that
    /// post.
    pub async fn delete(pool: &PgPool, post_id: i64, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $2 AND post_id = $1")
            .bind(post_id)
            .bind(comment_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_post(pool: &PgPool, post_id: i64) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
