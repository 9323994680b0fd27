//! Test harness with testcontainers for integration testing.
//!
//! Uses shared containers across all tests for dramatically improved
//! performance. Postgres and Redis are started once on the first test
//! and reused; migrations run once against the shared database.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

use server_core::kernel::{BaseModerationAgent, RedisLockService, ServerDeps};
use server_core::server::{build_app, build_state, AxumAppState};

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    redis_url: String,
    // Keep containers alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
    _redis: ContainerAsync<Redis>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Respect RUST_LOG; run tests with RUST_LOG=debug for detail.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let redis = Redis::default()
            .start()
            .await
            .context("Failed to start Redis container")?;

        let redis_host = redis.get_host().await?;
        let redis_port = redis.get_host_port_ipv4(6379).await?;
        let redis_url = format!("redis://{}:{}", redis_host, redis_port);

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            redis_url,
            _postgres: postgres,
            _redis: redis,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Each test gets a fresh pool and (via [`TestHarness::deps`]) fresh
/// dependencies, but reuses the same database and Redis containers.
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
    redis_url: String,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            db_pool,
            redis_url: infra.redis_url.clone(),
        })
    }

    /// Build dependencies backed by the real Redis lock store, with the
    /// given agent double (or `None` for moderation-disabled mode).
    pub async fn deps(&self, agent: Option<Arc<dyn BaseModerationAgent>>) -> Arc<ServerDeps> {
        let locks = RedisLockService::connect(&self.redis_url)
            .await
            .expect("Failed to connect to Redis lock store");

        Arc::new(ServerDeps::new(
            self.db_pool.clone(),
            Arc::new(locks),
            agent,
            Duration::from_secs(30),
        ))
    }

    /// Build the full application router around the given deps.
    pub fn app(&self, deps: Arc<ServerDeps>) -> (Router, AxumAppState) {
        let state = build_state(deps);
        (build_app(state.clone()), state)
    }
}
