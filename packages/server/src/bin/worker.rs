//! Standalone background worker.
//!
//! Consumes the shared Postgres job queue without serving HTTP. Run any
//! number of these alongside the API server; claims never collide.

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::kernel::jobs::{JobRunner, PostgresJobQueue};
use server_core::kernel::ServerDeps;
use server_core::server::build_job_registry;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting moderation worker");

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let deps = Arc::new(ServerDeps::from_config(&config, pool.clone()).await?);
    let job_queue = Arc::new(PostgresJobQueue::new(pool));

    let runner = JobRunner::new(job_queue, build_job_registry(), deps);
    runner.run_until_shutdown().await
}
