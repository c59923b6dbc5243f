//! Assessment endpoints: wizard steps, results, full edit and finalization.
//!
//! Form posts carry `score_{n}` / `notes_{n}` fields. They are parsed into a
//! [`StepSubmission`] before any database work, so malformed input never causes a
//! partial write. Successful posts answer with `303 See Other` to the next page.

use crate::{
    api::{AppState, error::ApiResult, identity::Caller},
    core::{
        assessment,
        report::{self, AssessmentReport, StepView},
        step::{self, Step, StepSubmission},
    },
};
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use std::collections::HashMap;
use tracing::debug;

type FormFields = Form<HashMap<String, String>>;

async fn show_step(
    state: &AppState,
    caller: &Caller,
    project_id: i64,
    step: Step,
    assessment_id: Option<i64>,
) -> ApiResult<Json<StepView>> {
    let view = report::generate_step_view(
        &state.database,
        caller.id(),
        project_id,
        step,
        assessment_id,
        &state.goals,
    )
    .await?;
    Ok(Json(view))
}

async fn save_step(
    state: &AppState,
    caller: &Caller,
    project_id: i64,
    step: Step,
    assessment_id: Option<i64>,
    fields: &HashMap<String, String>,
) -> ApiResult<Redirect> {
    let submission = StepSubmission::from_form(fields);
    let entry =
        assessment::resolve_step_entry(&state.database, caller.id(), project_id, step, assessment_id)
            .await?;
    let next = step::submit_step(
        &state.database,
        caller.id(),
        entry.assessment.id,
        step,
        &submission,
    )
    .await?;

    let target = next.path(project_id);
    debug!(%target, "Step saved, redirecting");
    Ok(Redirect::to(&target))
}

/// GET /projects/{project_id}/assessments/step1
///
/// Resumes the project's latest assessment. A project without one gets an empty form;
/// the draft is only created when step 1 is submitted.
pub async fn show_first_step(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<StepView>> {
    show_step(&state, &caller, project_id, Step::One, None).await
}

/// POST /projects/{project_id}/assessments/step1
pub async fn save_first_step(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Form(fields): FormFields,
) -> ApiResult<Redirect> {
    save_step(&state, &caller, project_id, Step::One, None, &fields).await
}

/// GET /projects/{project_id}/assessments/step5
///
/// Step 5 reached without an assessment id uses the project's current assessment.
pub async fn show_last_step(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<StepView>> {
    show_step(&state, &caller, project_id, Step::Five, None).await
}

/// POST /projects/{project_id}/assessments/step5
pub async fn save_last_step(
    caller: Caller,
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Form(fields): FormFields,
) -> ApiResult<Redirect> {
    save_step(&state, &caller, project_id, Step::Five, None, &fields).await
}

/// GET /projects/{project_id}/assessments/{assessment_id}/{step}
///
/// Step 1 is only addressed without an id, so `step1` here answers 422.
pub async fn show_assessment_step(
    caller: Caller,
    State(state): State<AppState>,
    Path((project_id, assessment_id, segment)): Path<(i64, i64, String)>,
) -> ApiResult<Json<StepView>> {
    let step = Step::from_segment(&segment)?;
    show_step(&state, &caller, project_id, step, Some(assessment_id)).await
}

/// POST /projects/{project_id}/assessments/{assessment_id}/{step}
pub async fn save_assessment_step(
    caller: Caller,
    State(state): State<AppState>,
    Path((project_id, assessment_id, segment)): Path<(i64, i64, String)>,
    Form(fields): FormFields,
) -> ApiResult<Redirect> {
    let step = Step::from_segment(&segment)?;
    save_step(&state, &caller, project_id, step, Some(assessment_id), &fields).await
}

/// GET /assessments/{assessment_id}
pub async fn show_results(
    caller: Caller,
    State(state): State<AppState>,
    Path(assessment_id): Path<i64>,
) -> ApiResult<Json<AssessmentReport>> {
    let report = report::generate_assessment_report(
        &state.database,
        caller.id(),
        assessment_id,
        &state.goals,
    )
    .await?;
    Ok(Json(report))
}

/// POST /assessments/{assessment_id}/edit
///
/// Saves scores for any of the 17 goals without touching the step flags.
pub async fn save_all_scores(
    caller: Caller,
    State(state): State<AppState>,
    Path(assessment_id): Path<i64>,
    Form(fields): FormFields,
) -> ApiResult<Redirect> {
    let submission = StepSubmission::from_form(&fields);
    assessment::edit_scores(&state.database, caller.id(), assessment_id, &submission).await?;
    Ok(Redirect::to(&step::results_path(assessment_id)))
}

/// POST /assessments/{assessment_id}/finalize
pub async fn finalize_assessment(
    caller: Caller,
    State(state): State<AppState>,
    Path(assessment_id): Path<i64>,
) -> ApiResult<Redirect> {
    assessment::finalize(&state.database, caller.id(), assessment_id).await?;
    Ok(Redirect::to(&step::results_path(assessment_id)))
}
