//! Server dependencies for job handlers and routes (using traits for
//! testability).
//!
//! This module provides the central dependency container handed to route
//! handlers and background job handlers. External collaborators (the
//! lock store, the moderation agent) sit behind trait objects so tests
//! can swap them out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::PgPool;

use crate::config::Config;
use crate::kernel::agent::{BaseModerationAgent, HttpModerationAgent};
use crate::kernel::locks::{BaseLockService, RedisLockService};

/// Server dependencies accessible to routes and job handlers.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Per-target moderation locks in the shared lock store.
    pub locks: Arc<dyn BaseLockService>,
    /// Moderation agent client. `None` means moderation is disabled and
    /// the whole pipeline degrades to a no-op.
    pub agent: Option<Arc<dyn BaseModerationAgent>>,
    /// TTL applied to moderation locks on acquisition.
    pub lock_ttl: Duration,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies.
    pub fn new(
        db_pool: PgPool,
        locks: Arc<dyn BaseLockService>,
        agent: Option<Arc<dyn BaseModerationAgent>>,
        lock_ttl: Duration,
    ) -> Self {
        Self {
            db_pool,
            locks,
            agent,
            lock_ttl,
        }
    }

    /// Build production dependencies from configuration.
    ///
    /// Connects the Redis lock store and, when an agent base URL is
    /// configured, the HTTP agent client.
    pub async fn from_config(config: &Config, db_pool: PgPool) -> Result<Self> {
        let locks: Arc<dyn BaseLockService> =
            Arc::new(RedisLockService::connect(&config.redis_url).await?);

        let agent: Option<Arc<dyn BaseModerationAgent>> = match &config.agent_base_url {
            Some(base_url) => Some(Arc::new(HttpModerationAgent::new(
                base_url.clone(),
                config.agent_timeout,
            )?)),
            None => {
                tracing::info!("AGENT_BASE_URL not set, content moderation is disabled");
                None
            }
        };

        Ok(Self::new(db_pool, locks, agent, config.lock_ttl))
    }

    /// Whether the moderation pipeline is active.
    pub fn moderation_enabled(&self) -> bool {
        self.agent.is_some()
    }
}
