//! Dispatcher: schedules a moderation job after content is persisted.
//!
//! Moderation is strictly best-effort relative to the primary write.
//! Nothing here may fail the originating create/edit request, so
//! `schedule` swallows queue errors (logging them) and is a silent
//! no-op when moderation is disabled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::verdict::TargetType;
use crate::kernel::jobs::{CommandMeta, JobQueue, JobQueueExt};

/// Background command that runs one classification attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerateContentJob {
    pub target_type: TargetType,
    pub target_id: i64,
    /// Snapshot of the content at dispatch time.
    pub content: String,
}

impl ModerateContentJob {
    pub const JOB_TYPE: &'static str = "moderate_content";
}

impl CommandMeta for ModerateContentJob {
    fn command_type(&self) -> &'static str {
        Self::JOB_TYPE
    }

    // The pipeline never retries on its own: agent failure already
    // produces a fallback verdict, and each edit re-dispatches with
    // fresh content. A retry would race the lock for stale content.
    fn max_retries(&self) -> i32 {
        0
    }
}

/// Schedules moderation work without blocking or failing the caller.
#[derive(Clone)]
pub struct ModerationDispatcher {
    queue: Arc<dyn JobQueue>,
    enabled: bool,
}

impl ModerationDispatcher {
    /// Create a dispatcher. When `enabled` is false (no agent
    /// configured), every `schedule` call is a no-op.
    pub fn new(queue: Arc<dyn JobQueue>, enabled: bool) -> Self {
        Self { queue, enabled }
    }

    /// Enqueue a moderation attempt for a freshly created or edited
    /// target. Never returns an error; a failed enqueue only costs this
    /// target its classification until the next edit.
    pub async fn schedule(&self, target_type: TargetType, target_id: i64, content: &str) {
        if !self.enabled {
            return;
        }

        let job = ModerateContentJob {
            target_type,
            target_id,
            content: content.to_string(),
        };

        match self.queue.enqueue(job).await {
            Ok(result) => {
                tracing::debug!(
                    job_id = %result.job_id(),
                    target_type = %target_type,
                    target_id,
                    "scheduled moderation job"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    target_type = %target_type,
                    target_id,
                    "failed to schedule moderation job"
                );
            }
        }
    }
}
