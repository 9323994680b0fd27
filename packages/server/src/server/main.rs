// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::kernel::jobs::JobRunner;
use server_core::kernel::ServerDeps;
use server_core::server::{build_app, build_job_registry, build_state};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Community Board API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire dependencies (lock store, agent client)
    let deps = Arc::new(ServerDeps::from_config(&config, pool).await?);
    let state = build_state(deps.clone());

    // Spawn the in-process job runner. A standalone `worker` binary can
    // consume the same queue from another process.
    let runner = JobRunner::new(state.job_queue.clone(), build_job_registry(), deps);
    tokio::spawn(async move {
        if let Err(e) = runner.run().await {
            tracing::error!(error = %e, "job runner exited with error");
        }
    });

    // Build application
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
