//! Job registry for deserializing and executing jobs.
//!
//! The registry maps job type strings (e.g., "moderate_content") to
//! handlers that reconstruct the typed command from JSON and run the
//! domain logic. The JobRunner claims rows from the queue and dispatches
//! them here without knowing any concrete command types.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

use super::queue::{ClaimedJob, CommandMeta};
use crate::kernel::ServerDeps;

/// Async handler invoked with the raw JSON payload and the shared deps.
type BoxedHandler = Box<
    dyn Fn(serde_json::Value, Arc<ServerDeps>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>
        + Send
        + Sync,
>;

/// Registry that maps job type strings to handlers.
///
/// Each domain registers its job types at startup:
///
/// ```ignore
/// let mut registry = JobRegistry::new();
/// registry.register::<ModerateContentJob, _, _>(
///     ModerateContentJob::JOB_TYPE,
///     |job, deps| async move { worker::run_moderation(&job, &deps).await },
/// );
/// ```
#[derive(Default)]
pub struct JobRegistry {
    handlers: HashMap<&'static str, BoxedHandler>,
}

impl JobRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a job type with its handler.
    ///
    /// The handler receives the deserialized command and the shared
    /// [`ServerDeps`] container.
    pub fn register<J, F, Fut>(&mut self, job_type: &'static str, handler: F)
    where
        J: CommandMeta + DeserializeOwned + Send + Sync + 'static,
        F: Fn(J, Arc<ServerDeps>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let boxed: BoxedHandler = Box::new(move |value, deps| {
            let handler = handler.clone();
            Box::pin(async move {
                let job: J = serde_json::from_value(value)
                    .map_err(|e| anyhow!("failed to deserialize {}: {}", job_type, e))?;
                handler(job, deps).await
            })
        });

        self.handlers.insert(job_type, boxed);
    }

    /// Execute a claimed job using its registered handler.
    ///
    /// Fails when the job type is unknown, the payload does not
    /// deserialize, or the handler itself errors.
    pub async fn execute(&self, job: &ClaimedJob, deps: Arc<ServerDeps>) -> Result<()> {
        let job_type = job.command_type();
        let handler = self
            .handlers
            .get(job_type)
            .ok_or_else(|| anyhow!("unknown job type: {}", job_type))?;

        let args = job
            .job
            .args
            .clone()
            .ok_or_else(|| anyhow!("job {} has no args", job.id))?;

        handler(args, deps).await
    }

    /// Check if a job type is registered.
    pub fn is_registered(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }
}

/// Thread-safe registry wrapped in Arc.
pub type SharedJobRegistry = Arc<JobRegistry>;
