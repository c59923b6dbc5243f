//! Assessment orchestration - lifecycle of the scoring wizard for a project.
//!
//! Resolves which assessment a wizard page works on (creating it lazily), keeps the
//! step-completion flags, and finalizes an assessment by averaging its recorded scores
//! into `overall_score`. Status only moves `draft -> completed`; finalizing a completed
//! assessment again simply recomputes and overwrites the score.

use crate::{
    core::{
        project::{ensure_owner, get_owned_project, get_project_by_id},
        score,
        step::{Step, StepSubmission, step_path},
    },
    entities::{Assessment, assessment, project},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument};

/// Lifecycle status of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    /// Wizard in progress
    Draft,
    /// Finalized with an overall score
    Completed,
}

impl AssessmentStatus {
    /// Value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
        }
    }

    /// Parses a stored status value.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "completed" => Ok(Self::Completed),
            other => Err(Error::Validation {
                message: format!("Unknown assessment status: {other}"),
            }),
        }
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assessment chosen for a wizard page, with the canonical path of that page.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEntry {
    /// Assessment the page operates on
    pub assessment: assessment::Model,
    /// Requested step
    pub step: Step,
    /// Canonical path of the step page
    pub route: String,
}

/// Finds an assessment by id regardless of owner.
pub async fn get_assessment_by_id<C>(db: &C, assessment_id: i64) -> Result<Option<assessment::Model>>
where
    C: ConnectionTrait,
{
    Assessment::find_by_id(assessment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The most recently created assessment of a project, ties broken by id.
pub async fn get_latest_for_project<C>(db: &C, project_id: i64) -> Result<Option<assessment::Model>>
where
    C: ConnectionTrait,
{
    Assessment::find()
        .filter(assessment::Column::ProjectId.eq(project_id))
        .order_by_desc(assessment::Column::CreatedAt)
        .order_by_desc(assessment::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a project's assessments, newest first. Ownership is checked by the caller.
pub async fn get_assessments_for_project<C>(db: &C, project_id: i64) -> Result<Vec<assessment::Model>>
where
    C: ConnectionTrait,
{
    Assessment::find()
        .filter(assessment::Column::ProjectId.eq(project_id))
        .order_by_desc(assessment::Column::CreatedAt)
        .order_by_desc(assessment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads an assessment together with its project and checks that `user_id` owns it.
///
/// # Errors
/// * `AssessmentNotFound` if the assessment does not exist
/// * `Forbidden` if the project belongs to another user
pub async fn get_owned_assessment<C>(
    db: &C,
    user_id: &str,
    assessment_id: i64,
) -> Result<(assessment::Model, project::Model)>
where
    C: ConnectionTrait,
{
    let record = get_assessment_by_id(db, assessment_id)
        .await?
        .ok_or(Error::AssessmentNotFound { id: assessment_id })?;
    let project = get_project_by_id(db, record.project_id)
        .await?
        .ok_or(Error::ProjectNotFound {
            id: record.project_id,
        })?;
    ensure_owner(&project, user_id)?;
    Ok((record, project))
}

/// Inserts a fresh draft assessment with every step flag cleared.
pub async fn create_assessment<C>(db: &C, project_id: i64) -> Result<assessment::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let record = assessment::ActiveModel {
        project_id: Set(project_id),
        version: Set(1),
        status: Set(AssessmentStatus::Draft.as_str().to_string()),
        step1_completed: Set(false),
        step2_completed: Set(false),
        step3_completed: Set(false),
        step4_completed: Set(false),
        step5_completed: Set(false),
        overall_score: Set(None),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(assessment_id = record.id, project_id, "Created assessment");
    Ok(record)
}

/// Returns the project's current assessment, creating a draft if it has none.
#[instrument(skip(db))]
pub async fn get_or_create(
    db: &DatabaseConnection,
    user_id: &str,
    project_id: i64,
) -> Result<assessment::Model> {
    let txn = db.begin().await?;
    get_owned_project(&txn, user_id, project_id).await?;

    let record = match get_latest_for_project(&txn, project_id).await? {
        Some(existing) => {
            debug!(assessment_id = existing.id, "Resuming assessment");
            existing
        }
        None => create_assessment(&txn, project_id).await?,
    };

    txn.commit().await?;
    Ok(record)
}

impl StepEntry {
    fn new(project_id: i64, step: Step, assessment: assessment::Model) -> Self {
        let route = step_path(project_id, step, assessment.id);
        Self {
            assessment,
            step,
            route,
        }
    }
}

/// Looks up the assessment a wizard page for `step` shows, without creating anything.
///
/// Step 1 is addressed through the project alone and yields `None` while the project
/// has no assessment. Later steps use `assessment_id` when given, which must belong to
/// the project; without it they fall back to the project's current assessment.
///
/// # Errors
/// * `ProjectNotFound` / `Forbidden` for the project
/// * `Validation` if step 1 is addressed with an assessment id
/// * `AssessmentNotFound` if the id does not belong to the project
/// * `NoAssessmentForProject` if a later step has no assessment to fall back to
#[instrument(skip(db, step), fields(step = step.number()))]
pub async fn find_step_entry(
    db: &DatabaseConnection,
    user_id: &str,
    project_id: i64,
    step: Step,
    assessment_id: Option<i64>,
) -> Result<Option<StepEntry>> {
    get_owned_project(db, user_id, project_id).await?;

    let record = match (step, assessment_id) {
        (Step::One, Some(id)) => {
            return Err(Error::Validation {
                message: format!("Step 1 is addressed without an assessment id, got {id}"),
            });
        }
        (Step::One, None) => get_latest_for_project(db, project_id).await?,
        (_, Some(id)) => Some(
            get_assessment_by_id(db, id)
                .await?
                .filter(|a| a.project_id == project_id)
                .ok_or(Error::AssessmentNotFound { id })?,
        ),
        (_, None) => Some(
            get_latest_for_project(db, project_id)
                .await?
                .ok_or(Error::NoAssessmentForProject { project_id })?,
        ),
    };

    Ok(record.map(|a| StepEntry::new(project_id, step, a)))
}

/// Decides which assessment a step submission writes to.
///
/// Same lookup as [`find_step_entry`], except that step 1 creates the project's
/// first assessment when it has none.
#[instrument(skip(db, step), fields(step = step.number()))]
pub async fn resolve_step_entry(
    db: &DatabaseConnection,
    user_id: &str,
    project_id: i64,
    step: Step,
    assessment_id: Option<i64>,
) -> Result<StepEntry> {
    if step == Step::One && assessment_id.is_none() {
        let record = get_or_create(db, user_id, project_id).await?;
        return Ok(StepEntry::new(project_id, step, record));
    }
    find_step_entry(db, user_id, project_id, step, assessment_id)
        .await?
        .ok_or(Error::NoAssessmentForProject { project_id })
}

/// Whether the completion flag of `step` is set.
#[must_use]
pub const fn is_step_complete(record: &assessment::Model, step: Step) -> bool {
    match step {
        Step::One => record.step1_completed,
        Step::Two => record.step2_completed,
        Step::Three => record.step3_completed,
        Step::Four => record.step4_completed,
        Step::Five => record.step5_completed,
    }
}

/// Steps whose completion flag is set, in wizard order.
#[must_use]
pub fn completed_steps(record: &assessment::Model) -> Vec<Step> {
    Step::ALL
        .into_iter()
        .filter(|step| is_step_complete(record, *step))
        .collect()
}

/// Sets the completion flag of `step` and touches `updated_at`. Other flags are untouched.
pub async fn mark_step_complete<C>(
    db: &C,
    record: assessment::Model,
    step: Step,
) -> Result<assessment::Model>
where
    C: ConnectionTrait,
{
    let mut active: assessment::ActiveModel = record.into();
    match step {
        Step::One => active.step1_completed = Set(true),
        Step::Two => active.step2_completed = Set(true),
        Step::Three => active.step3_completed = Set(true),
        Step::Four => active.step4_completed = Set(true),
        Step::Five => active.step5_completed = Set(true),
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Averages all recorded scores into `overall_score` and marks the assessment completed.
///
/// The score read and the status write happen in one transaction, so a concurrent
/// step submission is either fully included or not at all. With no scores the overall
/// score is `0.0`.
#[instrument(skip(db))]
pub async fn finalize(
    db: &DatabaseConnection,
    user_id: &str,
    assessment_id: i64,
) -> Result<assessment::Model> {
    let txn = db.begin().await?;

    let (record, _project) = get_owned_assessment(&txn, user_id, assessment_id).await?;
    let scores = score::get_scores(&txn, record.id).await?;
    let overall = score::mean_score(scores.values());

    let now = chrono::Utc::now();
    let mut active: assessment::ActiveModel = record.into();
    active.status = Set(AssessmentStatus::Completed.as_str().to_string());
    active.overall_score = Set(Some(overall));
    active.completed_at = Set(Some(now));
    active.updated_at = Set(now);
    let finalized = active.update(&txn).await?;

    txn.commit().await?;
    info!(overall_score = overall, scored = scores.len(), "Finalized assessment");
    Ok(finalized)
}

/// Applies an "edit all" submission covering any of the 17 goals.
///
/// Goals with a blank score are skipped, step flags and status are left alone, and
/// `updated_at` is touched.
#[instrument(skip(db, submission))]
pub async fn edit_scores(
    db: &DatabaseConnection,
    user_id: &str,
    assessment_id: i64,
    submission: &StepSubmission,
) -> Result<assessment::Model> {
    let txn = db.begin().await?;

    let (record, _project) = get_owned_assessment(&txn, user_id, assessment_id).await?;
    let all_goals: Vec<i32> = Step::ALL
        .iter()
        .flat_map(|step| step.goals().iter().copied())
        .collect();
    let writes = submission.scored_entries(&all_goals)?;
    let recorded = writes.len();

    for (goal, value, note) in writes {
        score::upsert_score(&txn, record.id, goal, value, note).await?;
    }

    let mut active: assessment::ActiveModel = record.into();
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    info!(recorded, "Edited assessment scores");
    Ok(updated)
}
