//! Project endpoints.

use crate::{
    api::{AppState, error::ApiResult, identity::Caller},
    core::{
        project::{self, NewProject},
        report::{self, ProjectOverview},
    },
    entities::project as project_entity,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
};

/// GET /projects
pub async fn list_projects(
    caller: Caller,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<project_entity::Model>>> {
    let projects = project::get_projects_for_user(&state.database, caller.id()).await?;
    Ok(Json(projects))
}

/// POST /projects
pub async fn create_project(
    caller: Caller,
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<project_entity::Model>)> {
    let created = project::create_project(&state.database, caller.id(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /projects/{project_id}
///
/// The project with its assessments, newest first.
pub async fn get_project(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<ProjectOverview>> {
    let overview =
        report::generate_project_overview(&state.database, caller.id(), project_id).await?;
    Ok(Json(overview))
}

/// POST /projects/{project_id}/edit
pub async fn update_project(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(input): Json<NewProject>,
) -> ApiResult<Json<project_entity::Model>> {
    let updated =
        project::update_project(&state.database, caller.id(), project_id, input).await?;
    Ok(Json(updated))
}

/// POST /projects/{project_id}/delete
///
/// Removes the project with its assessments and scores, then returns to the list.
pub async fn delete_project(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Redirect> {
    project::delete_project(&state.database, caller.id(), project_id).await?;
    Ok(Redirect::to("/projects"))
}
