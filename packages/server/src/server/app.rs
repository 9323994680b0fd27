//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::moderation::{register_moderation_jobs, ModerationDispatcher};
use crate::kernel::jobs::{JobQueue, JobRegistry, PostgresJobQueue, SharedJobRegistry};
use crate::kernel::ServerDeps;
use crate::server::routes::{
    add_comment_handler, create_post_handler, delete_comment_handler, delete_post_handler,
    get_post_handler, health_handler, list_posts_handler, moderation_result_handler,
    toggle_like_handler, update_comment_handler, update_post_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
    pub job_queue: Arc<dyn JobQueue>,
    pub dispatcher: ModerationDispatcher,
}

/// Assemble shared state around the dependency container.
///
/// The dispatcher is enabled only when an agent client is configured;
/// otherwise every schedule call is a silent no-op.
pub fn build_state(deps: Arc<ServerDeps>) -> AxumAppState {
    let job_queue: Arc<dyn JobQueue> = Arc::new(PostgresJobQueue::new(deps.db_pool.clone()));
    let dispatcher = ModerationDispatcher::new(job_queue.clone(), deps.moderation_enabled());

    AxumAppState {
        db_pool: deps.db_pool.clone(),
        deps,
        job_queue,
        dispatcher,
    }
}

/// Registry with every background job handler this server knows.
pub fn build_job_registry() -> SharedJobRegistry {
    let mut registry = JobRegistry::new();
    register_moderation_jobs(&mut registry);
    Arc::new(registry)
}

/// Build the Axum application router
pub fn build_app(state: AxumAppState) -> Router {
    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        // Posts
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route(
            "/posts/:post_id",
            get(get_post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/posts/:post_id/like", post(toggle_like_handler))
        // Comments
        .route("/posts/:post_id/comments", post(add_comment_handler))
        .route(
            "/posts/:post_id/comments/:comment_id",
            put(update_comment_handler).delete(delete_comment_handler),
        )
        // Internal: verdict push from the moderation agent
        .route(
            "/internal/moderation-result",
            post(moderation_result_handler),
        )
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
