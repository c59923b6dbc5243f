//! Report generation - results and step views of an assessment.
//!
//! Joins an assessment's recorded scores with the goal catalog so the interface layer
//! receives ready-to-render structures. Nothing here mutates the database.

use crate::{
    core::{
        assessment::{
            AssessmentStatus, completed_steps, find_step_entry, get_assessments_for_project,
            get_owned_assessment,
        },
        goal::GoalCatalog,
        project::get_owned_project,
        score::{get_scores, mean_score},
        step::{Step, first_step_path},
    },
    entities::{assessment, goal, project, score},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;

/// One goal of a report together with what was recorded for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalResult {
    /// Goal metadata
    pub goal: goal::Model,
    /// Wizard step the goal belongs to
    pub step: Step,
    /// Recorded score, `None` if the goal has not been scored
    pub score: Option<i32>,
    /// Recorded note
    pub notes: Option<String>,
}

/// Results view of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    /// The assessment itself
    pub assessment: assessment::Model,
    /// Project the assessment belongs to
    pub project: project::Model,
    /// Parsed lifecycle status
    pub status: AssessmentStatus,
    /// All 17 goals in number order
    pub goals: Vec<GoalResult>,
    /// Steps submitted so far
    pub completed_steps: Vec<Step>,
    /// How many goals carry a score
    pub scored_goals: usize,
    /// Stored overall score, only set once finalized
    pub overall_score: Option<f64>,
    /// Display form of `overall_score`
    pub score_label: String,
    /// Mean of the scores recorded so far
    pub provisional_score: f64,
}

/// A project with its assessments, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectOverview {
    /// The project
    pub project: project::Model,
    /// Its assessments, newest first
    pub assessments: Vec<assessment::Model>,
}

/// Data needed to render one wizard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    /// Assessment being filled in, `None` before step 1 is first submitted
    pub assessment_id: Option<i64>,
    /// Owning project
    pub project_id: i64,
    /// Step shown
    pub step: Step,
    /// Page title
    pub title: &'static str,
    /// Path the form posts to
    pub route: String,
    /// Goals of the step with their current values
    pub goals: Vec<GoalResult>,
}

fn goal_result(
    catalog: &GoalCatalog,
    scores: &BTreeMap<i32, score::Model>,
    number: i32,
) -> Result<GoalResult> {
    let goal = catalog
        .get(number)
        .cloned()
        .ok_or(Error::GoalNotFound { number })?;
    let step = Step::for_goal(number).ok_or(Error::GoalNotFound { number })?;
    let recorded = scores.get(&number);
    Ok(GoalResult {
        goal,
        step,
        score: recorded.and_then(|entry| entry.score),
        notes: recorded.and_then(|entry| entry.notes.clone()),
    })
}

/// Builds the results view of an assessment owned by `user_id`.
///
/// # Errors
/// * `AssessmentNotFound` / `Forbidden` from the ownership check
/// * `GoalNotFound` if the catalog is incomplete
pub async fn generate_assessment_report(
    db: &DatabaseConnection,
    user_id: &str,
    assessment_id: i64,
    catalog: &GoalCatalog,
) -> Result<AssessmentReport> {
    let (record, project) = get_owned_assessment(db, user_id, assessment_id).await?;
    let scores = get_scores(db, record.id).await?;

    let goals = catalog
        .iter()
        .map(|g| goal_result(catalog, &scores, g.id))
        .collect::<Result<Vec<_>>>()?;
    let scored_goals = goals.iter().filter(|g| g.score.is_some()).count();

    Ok(AssessmentReport {
        status: AssessmentStatus::parse(&record.status)?,
        completed_steps: completed_steps(&record),
        overall_score: record.overall_score,
        score_label: format_score(record.overall_score),
        provisional_score: mean_score(scores.values()),
        scored_goals,
        goals,
        assessment: record,
        project,
    })
}

/// Builds the page data for `step` of a project owned by `user_id`.
///
/// Nothing is created: step 1 of a project without an assessment renders with empty
/// goals and no assessment id. The assessment is chosen as in
/// [`find_step_entry`](crate::core::assessment::find_step_entry).
pub async fn generate_step_view(
    db: &DatabaseConnection,
    user_id: &str,
    project_id: i64,
    step: Step,
    assessment_id: Option<i64>,
    catalog: &GoalCatalog,
) -> Result<StepView> {
    let entry = find_step_entry(db, user_id, project_id, step, assessment_id).await?;
    let scores = match &entry {
        Some(entry) => get_scores(db, entry.assessment.id).await?,
        None => BTreeMap::new(),
    };

    let goals = step
        .goals()
        .iter()
        .map(|number| goal_result(catalog, &scores, *number))
        .collect::<Result<Vec<_>>>()?;

    let (assessment_id, route) = match entry {
        Some(entry) => (Some(entry.assessment.id), entry.route),
        None => (None, first_step_path(project_id)),
    };

    Ok(StepView {
        assessment_id,
        project_id,
        step,
        title: step.title(),
        route,
        goals,
    })
}

/// Builds the project page: the project and its assessments, newest first.
pub async fn generate_project_overview(
    db: &DatabaseConnection,
    user_id: &str,
    project_id: i64,
) -> Result<ProjectOverview> {
    let project = get_owned_project(db, user_id, project_id).await?;
    let assessments = get_assessments_for_project(db, project.id).await?;
    Ok(ProjectOverview {
        project,
        assessments,
    })
}

/// Formats an overall score for display, e.g. `"3.67 / 5"`.
#[must_use]
pub fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "not scored".to_string(), |value| format!("{value:.2} / 5"))
}
