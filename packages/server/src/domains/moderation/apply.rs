//! Result applier: writes a verdict onto the target row.
//!
//! The single writer of `moderation_status`/`moderation_reason`.
//! Application is an idempotent overwrite; re-applying a verdict, or
//! applying an older one after a newer one, still leaves the row in a
//! valid terminal state (last write wins, see DESIGN.md).

use anyhow::Result;
use sqlx::PgPool;

use super::verdict::{TargetType, Verdict};

/// What happened when a verdict was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The target row no longer exists. Moderating deleted content is
    /// meaningless, so this is a no-op rather than an error.
    TargetMissing,
}

/// Apply a verdict to its target's row.
pub async fn apply_verdict(pool: &PgPool, verdict: &Verdict) -> Result<ApplyOutcome> {
    let status = verdict.action.status();

    let result = match verdict.target_type {
        TargetType::Post => {
            sqlx::query(
                r#"
                UPDATE posts
                SET moderation_status = $1,
                    moderation_reason = $2,
                    updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(status)
            .bind(&verdict.reason)
            .bind(verdict.target_id)
            .execute(pool)
            .await?
        }
        TargetType::Comment => {
            sqlx::query(
                r#"
                UPDATE comments
                SET moderation_status = $1,
                    moderation_reason = $2
                WHERE id = $3
                "#,
            )
            .bind(status)
            .bind(&verdict.reason)
            .bind(verdict.target_id)
            .execute(pool)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        tracing::debug!(
            target_type = %verdict.target_type,
            target_id = verdict.target_id,
            "verdict target no longer exists, skipping"
        );
        return Ok(ApplyOutcome::TargetMissing);
    }

    tracing::info!(
        target_type = %verdict.target_type,
        target_id = verdict.target_id,
        status = status.as_str(),
        "applied moderation verdict"
    );

    Ok(ApplyOutcome::Applied)
}
