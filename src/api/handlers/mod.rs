//! Request handlers, grouped by resource.

/// Wizard steps, results, full edit and finalization
pub mod assessments;
/// Project CRUD
pub mod projects;

use crate::{api::AppState, entities::goal};
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /goals
///
/// The 17 goals in number order, served from the catalog loaded at startup.
pub async fn list_goals(State(state): State<AppState>) -> Json<Vec<goal::Model>> {
    Json(state.goals.iter().cloned().collect())
}
