//! HTTP layer - axum router over the core assessment workflow.
//!
//! Handlers are thin: they extract the caller identity, turn form fields into typed
//! submissions, call into `core`, and map results onto JSON or redirects.

/// Error responses
pub mod error;
/// Route handlers
pub mod handlers;
/// Caller identity extraction
pub mod identity;

use crate::{core::goal::GoalCatalog, errors::Result};
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub database: DatabaseConnection,
    /// Goal metadata loaded once at startup
    pub goals: Arc<GoalCatalog>,
}

impl AppState {
    /// Wraps the catalog for sharing across handlers.
    #[must_use]
    pub fn new(database: DatabaseConnection, goals: GoalCatalog) -> Self {
        Self {
            database,
            goals: Arc::new(goals),
        }
    }
}

/// Builds the application router.
///
/// ```text
/// /health                                               liveness
/// /goals                                                goal catalog
/// /projects                                             list, create
/// /projects/{project_id}                                get, with assessments
/// /projects/{project_id}/edit                           update (POST)
/// /projects/{project_id}/delete                         delete (POST)
/// /projects/{project_id}/assessments/step1              step 1 view / submit
/// /projects/{project_id}/assessments/step5              step 5 without an id
/// /projects/{project_id}/assessments/{id}/{step}        steps 2-5 view / submit
/// /assessments/{id}                                     results
/// /assessments/{id}/edit                                full edit (POST)
/// /assessments/{id}/finalize                            finalize (POST)
/// ```
pub fn router(state: AppState) -> Router {
    use handlers::{assessments, projects};

    Router::new()
        .route("/health", get(handlers::health))
        .route("/goals", get(handlers::list_goals))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/{project_id}", get(projects::get_project))
        .route("/projects/{project_id}/edit", post(projects::update_project))
        .route("/projects/{project_id}/delete", post(projects::delete_project))
        .route(
            "/projects/{project_id}/assessments/step1",
            get(assessments::show_first_step).post(assessments::save_first_step),
        )
        .route(
            "/projects/{project_id}/assessments/step5",
            get(assessments::show_last_step).post(assessments::save_last_step),
        )
        .route(
            "/projects/{project_id}/assessments/{assessment_id}/{step}",
            get(assessments::show_assessment_step).post(assessments::save_assessment_step),
        )
        .route("/assessments/{assessment_id}", get(assessments::show_results))
        .route(
            "/assessments/{assessment_id}/edit",
            post(assessments::save_all_scores),
        )
        .route(
            "/assessments/{assessment_id}/finalize",
            post(assessments::finalize_assessment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `bind_address` and serves until Ctrl-C.
pub async fn serve(state: AppState, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
