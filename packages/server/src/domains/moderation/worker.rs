//! Moderation worker: one classification round trip per job.
//!
//! The worker holds the target's lock for the duration of the agent
//! call, so at most one attempt is in flight per target across all
//! worker processes. Whatever happens downstream of acquisition, the
//! lock is released before the handler returns.

use std::sync::Arc;

use anyhow::Result;

use super::apply::apply_verdict;
use super::dispatcher::ModerateContentJob;
use super::verdict::{lock_key, Verdict, VerdictAction};
use crate::kernel::jobs::JobRegistry;
use crate::kernel::{BaseModerationAgent, ServerDeps};

/// Register moderation job handlers with the runner's registry.
pub fn register_moderation_jobs(registry: &mut JobRegistry) {
    registry.register::<ModerateContentJob, _, _>(
        ModerateContentJob::JOB_TYPE,
        |job, deps| async move { run_moderation(&job, &deps).await },
    );
}

/// Run one moderation attempt for a target.
///
/// Policy:
/// 1. No agent configured: moderation is disabled, return immediately.
/// 2. Lock held by another attempt: abort quietly, no agent call, no
///    state write.
/// 3. Agent failure of any kind: synthesize a `review` fallback so the
///    target never sits at `pending` because the agent is down.
/// 4. Release the lock on every exit path past acquisition.
pub async fn run_moderation(job: &ModerateContentJob, deps: &Arc<ServerDeps>) -> Result<()> {
    let Some(agent) = deps.agent.clone() else {
        tracing::debug!("moderation disabled, skipping job");
        return Ok(());
    };

    let key = lock_key(job.target_type, job.target_id);
    let Some(token) = deps.locks.try_acquire(&key, deps.lock_ttl).await? else {
        tracing::debug!(
            target_type = %job.target_type,
            target_id = job.target_id,
            "moderation already in flight for target, skipping"
        );
        return Ok(());
    };

    // No `?` between here and release: the lock must not leak.
    let outcome = classify_and_apply(job, agent.as_ref(), deps).await;

    match deps.locks.release(&key, &token).await {
        Ok(true) => {}
        Ok(false) => {
            // Lock expired mid-run; the TTL safety net fired.
            tracing::warn!(key = %key, "moderation lock expired before release");
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to release moderation lock");
        }
    }

    outcome
}

/// Call the agent and apply the resulting verdict.
///
/// Agent failures are recovered here by falling back to `review`; only
/// database errors propagate.
async fn classify_and_apply(
    job: &ModerateContentJob,
    agent: &dyn BaseModerationAgent,
    deps: &Arc<ServerDeps>,
) -> Result<()> {
    let (action, reason) = match agent
        .moderate(job.target_type, job.target_id, &job.content)
        .await
    {
        Ok(response) => {
            let action = VerdictAction::normalize(response.raw_action().unwrap_or(""));
            (action, response.reason)
        }
        Err(e) => {
            tracing::warn!(
                target_type = %job.target_type,
                target_id = job.target_id,
                error = %e,
                "agent call failed, falling back to review"
            );
            (
                VerdictAction::Review,
                Some(format!("agent_error: {}", e.kind())),
            )
        }
    };

    let verdict = Verdict {
        target_type: job.target_type,
        target_id: job.target_id,
        action,
        reason,
    };

    apply_verdict(&deps.db_pool, &verdict).await?;
    Ok(())
}
