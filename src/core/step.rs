//! Step processor - records one wizard step's scores and marks the step complete.
//!
//! The wizard has five fixed steps, each covering a fixed subset of the 17 goals.
//! A step submission upserts every goal of that subset that carries a score, skips
//! goals submitted with a blank score, ignores goals outside the subset, and flips
//! the step's completion flag. The upserts and the flag flip share one transaction.

use crate::{
    core::{assessment, goal::is_valid_goal, score},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{info, instrument};

/// Lowest accepted score.
pub const MIN_SCORE: i32 = 1;
/// Highest accepted score.
pub const MAX_SCORE: i32 = 5;

/// One of the five wizard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum Step {
    /// Goals 1, 2, 3, 6
    One,
    /// Goals 4, 5, 8, 10
    Two,
    /// Goals 7, 9, 11, 12
    Three,
    /// Goals 13, 14, 15
    Four,
    /// Goals 16, 17
    Five,
}

impl Step {
    /// All steps in wizard order.
    pub const ALL: [Self; 5] = [Self::One, Self::Two, Self::Three, Self::Four, Self::Five];

    /// Converts a 1-based step number.
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(Error::InvalidStep {
                step: other.to_string(),
            }),
        }
    }

    /// Parses a path segment of the form `step3`.
    pub fn from_segment(segment: &str) -> Result<Self> {
        segment
            .strip_prefix("step")
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(|| Error::InvalidStep {
                step: segment.to_string(),
            })
            .and_then(Self::from_number)
    }

    /// 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// Goal numbers covered by this step.
    #[must_use]
    pub const fn goals(self) -> &'static [i32] {
        match self {
            Self::One => &[1, 2, 3, 6],
            Self::Two => &[4, 5, 8, 10],
            Self::Three => &[7, 9, 11, 12],
            Self::Four => &[13, 14, 15],
            Self::Five => &[16, 17],
        }
    }

    /// Page title shown for the step.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::One => "Basic Needs",
            Self::Two => "Enablers and Opportunities",
            Self::Three => "Sustainable Infrastructure",
            Self::Four => "Environmental Stewardship",
            Self::Five => "Governance and Partnerships",
        }
    }

    /// The following step, `None` after step 5.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => Some(Self::Four),
            Self::Four => Some(Self::Five),
            Self::Five => None,
        }
    }

    /// The step whose subset contains `goal`.
    #[must_use]
    pub fn for_goal(goal: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.goals().contains(&goal))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step{}", self.number())
    }
}

/// Navigation path of a step page.
///
/// Step 1 is addressed through the project alone; later steps carry the assessment id.
#[must_use]
pub fn step_path(project_id: i64, step: Step, assessment_id: i64) -> String {
    match step {
        Step::One => first_step_path(project_id),
        other => format!("/projects/{project_id}/assessments/{assessment_id}/{other}"),
    }
}

/// Path of step 1, which never carries an assessment id.
#[must_use]
pub fn first_step_path(project_id: i64) -> String {
    format!("/projects/{project_id}/assessments/step1")
}

/// Path of the results page for an assessment.
#[must_use]
pub fn results_path(assessment_id: i64) -> String {
    format!("/assessments/{assessment_id}")
}

/// Where the wizard goes after a step has been saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRoute {
    /// Continue with the given step
    Step {
        /// Step to show next
        step: Step,
        /// Assessment being filled in
        assessment_id: i64,
    },
    /// The last step was saved; show the results
    Results {
        /// Assessment to show
        assessment_id: i64,
    },
}

impl NextRoute {
    /// Route following a successful submission of `step`.
    #[must_use]
    pub const fn after(step: Step, assessment_id: i64) -> Self {
        match step.next() {
            Some(next) => Self::Step {
                step: next,
                assessment_id,
            },
            None => Self::Results { assessment_id },
        }
    }

    /// Concrete path to redirect to.
    #[must_use]
    pub fn path(&self, project_id: i64) -> String {
        match *self {
            Self::Step {
                step,
                assessment_id,
            } => step_path(project_id, step, assessment_id),
            Self::Results { assessment_id } => results_path(assessment_id),
        }
    }
}

/// Score and note submitted for one goal.
///
/// The score is kept as submitted and only parsed once the goals it applies to are
/// known, so malformed input for a goal outside the step cannot fail the step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalInput {
    /// Raw submitted score, `None` when blank
    pub score: Option<String>,
    /// Submitted note, `None` when blank
    pub note: Option<String>,
}

/// Typed form submission: goal number to submitted score and note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSubmission {
    entries: BTreeMap<i32, GoalInput>,
}

impl StepSubmission {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; blank notes are dropped.
    #[must_use]
    pub fn with(mut self, goal: i32, score: Option<i32>, note: &str) -> Self {
        self.insert(
            goal,
            GoalInput {
                score: score.map(|value| value.to_string()),
                note: non_blank(note),
            },
        );
        self
    }

    /// Adds or replaces the input for `goal`.
    pub fn insert(&mut self, goal: i32, input: GoalInput) {
        self.entries.insert(goal, input);
    }

    /// Input submitted for `goal`, if any.
    #[must_use]
    pub fn get(&self, goal: i32) -> Option<&GoalInput> {
        self.entries.get(&goal)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a submission from `score_{n}` / `notes_{n}` form fields.
    ///
    /// Fields for numbers outside 1..=17 and unrelated fields are ignored. Blank
    /// scores and notes become `None`. Scores are not parsed here.
    #[must_use]
    pub fn from_form(fields: &HashMap<String, String>) -> Self {
        let mut submission = Self::new();
        for (key, value) in fields {
            if let Some(goal) = field_goal(key, "score_") {
                submission.entries.entry(goal).or_default().score =
                    non_blank(value).map(|raw| raw.trim().to_string());
            } else if let Some(goal) = field_goal(key, "notes_") {
                submission.entries.entry(goal).or_default().note = non_blank(value);
            }
        }
        submission
    }

    /// Validated `(goal, score, note)` writes for the given goal subset.
    ///
    /// Goals outside `goals` and goals with a blank score are skipped. A score that is
    /// not an integer in `MIN_SCORE..=MAX_SCORE` fails with `InvalidScore`.
    pub(crate) fn scored_entries(&self, goals: &[i32]) -> Result<Vec<(i32, i32, Option<String>)>> {
        goals
            .iter()
            .filter_map(|goal| self.entries.get(goal).map(|input| (*goal, input)))
            .filter_map(|(goal, input)| input.score.as_deref().map(|raw| (goal, raw, input)))
            .map(|(goal, raw, input)| {
                let value = parse_score(goal, raw)?;
                validate_score(goal, value)?;
                Ok((goal, value, input.note.clone()))
            })
            .collect()
    }
}

fn field_goal(key: &str, prefix: &str) -> Option<i32> {
    key.strip_prefix(prefix)
        .and_then(|n| n.parse::<i32>().ok())
        .filter(|n| is_valid_goal(*n))
}

fn parse_score(goal: i32, raw: &str) -> Result<i32> {
    raw.trim().parse::<i32>().map_err(|_| Error::InvalidScore {
        goal,
        value: raw.to_string(),
    })
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Rejects scores outside `MIN_SCORE..=MAX_SCORE`.
pub fn validate_score(goal: i32, value: i32) -> Result<()> {
    if (MIN_SCORE..=MAX_SCORE).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidScore {
            goal,
            value: value.to_string(),
        })
    }
}

/// Processes one wizard step for an assessment owned by `user_id`.
///
/// Runs in a single transaction: either every score of the step and the completion
/// flag are written, or nothing is.
///
/// # Errors
/// * `AssessmentNotFound` if the assessment does not exist
/// * `Forbidden` if the caller does not own its project
/// * `InvalidScore` if a submitted score of this step is out of range
#[instrument(skip(db, submission, step), fields(step = step.number()))]
pub async fn submit_step(
    db: &DatabaseConnection,
    user_id: &str,
    assessment_id: i64,
    step: Step,
    submission: &StepSubmission,
) -> Result<NextRoute> {
    let txn = db.begin().await?;

    let (record, _project) = assessment::get_owned_assessment(&txn, user_id, assessment_id).await?;
    let writes = submission.scored_entries(step.goals())?;
    let recorded = writes.len();

    for (goal, value, note) in writes {
        score::upsert_score(&txn, record.id, goal, value, note).await?;
    }
    assessment::mark_step_complete(&txn, record, step).await?;

    txn.commit().await?;
    info!(recorded, "Saved assessment step");

    Ok(NextRoute::after(step, assessment_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::score::get_scores;
    use crate::test_utils::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_step_goal_subsets_cover_all_goals_once() {
        let mut all: Vec<i32> = Step::ALL.iter().flat_map(|s| s.goals().iter().copied()).collect();
        all.sort_unstable();
        assert_eq!(all, (1..=17).collect::<Vec<_>>());
        assert_eq!(Step::for_goal(6), Some(Step::One));
        assert_eq!(Step::for_goal(10), Some(Step::Two));
        assert_eq!(Step::for_goal(18), None);
    }

    #[test]
    fn test_step_parsing() {
        assert_eq!(Step::from_number(3).unwrap(), Step::Three);
        assert!(matches!(Step::from_number(0), Err(Error::InvalidStep { .. })));
        assert!(matches!(Step::from_number(6), Err(Error::InvalidStep { .. })));
        assert_eq!(Step::from_segment("step5").unwrap(), Step::Five);
        assert!(Step::from_segment("stepx").is_err());
        assert!(Step::from_segment("5").is_err());
        assert_eq!(Step::Four.to_string(), "step4");
    }

    #[test]
    fn test_next_route() {
        assert_eq!(
            NextRoute::after(Step::One, 9),
            NextRoute::Step {
                step: Step::Two,
                assessment_id: 9
            }
        );
        assert_eq!(NextRoute::after(Step::Five, 9), NextRoute::Results { assessment_id: 9 });
        assert_eq!(
            NextRoute::after(Step::Four, 9).path(2),
            "/projects/2/assessments/9/step5"
        );
        assert_eq!(NextRoute::after(Step::Five, 9).path(2), "/assessments/9");
        assert_eq!(step_path(2, Step::One, 9), "/projects/2/assessments/step1");
    }

    #[test]
    fn test_from_form() {
        let submission = StepSubmission::from_form(&form(&[
            ("score_1", " 4 "),
            ("notes_1", "community kitchen"),
            ("score_2", ""),
            ("notes_2", "n/a"),
            ("notes_3", "   "),
            ("score_99", "5"),
            ("csrf_token", "abc"),
        ]));

        assert_eq!(
            submission.get(1),
            Some(&GoalInput {
                score: Some("4".to_string()),
                note: Some("community kitchen".to_string()),
            })
        );
        assert_eq!(
            submission.get(2),
            Some(&GoalInput {
                score: None,
                note: Some("n/a".to_string()),
            })
        );
        assert_eq!(submission.get(3), Some(&GoalInput::default()));
        assert!(submission.get(99).is_none());
    }

    #[test]
    fn test_non_numeric_score_is_rejected_within_subset_only() {
        let submission = StepSubmission::from_form(&form(&[("score_4", "high"), ("score_7", "3")]));

        assert!(matches!(
            submission.scored_entries(Step::Two.goals()),
            Err(Error::InvalidScore { goal: 4, .. })
        ));
        assert_eq!(
            submission.scored_entries(Step::Three.goals()).unwrap(),
            vec![(7, 3, None)]
        );
    }

    #[test]
    fn test_scored_entries_filters_and_validates() {
        let submission = StepSubmission::new()
            .with(7, Some(3), "panels")
            .with(9, None, "pending")
            .with(1, Some(5), "");

        let writes = submission.scored_entries(Step::Three.goals()).unwrap();
        assert_eq!(writes, vec![(7, 3, Some("panels".to_string()))]);

        let out_of_range = StepSubmission::new().with(7, Some(6), "");
        assert!(matches!(
            out_of_range.scored_entries(Step::Three.goals()),
            Err(Error::InvalidScore { goal: 7, .. })
        ));
        assert!(validate_score(1, 0).is_err());
        assert!(validate_score(1, 1).is_ok());
        assert!(validate_score(1, 5).is_ok());
    }

    #[tokio::test]
    async fn test_submit_step_records_scores_and_flag() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;

        let submission = StepSubmission::new()
            .with(4, Some(3), "curriculum")
            .with(5, Some(4), "")
            .with(8, None, "");
        let next = submit_step(&db, &project.user_id, assessment.id, Step::Two, &submission).await?;
        assert_eq!(
            next,
            NextRoute::Step {
                step: Step::Three,
                assessment_id: assessment.id
            }
        );

        let scores = get_scores(&db, assessment.id).await?;
        assert_eq!(scores.keys().copied().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(scores[&4].notes.as_deref(), Some("curriculum"));
        assert_eq!(scores[&5].notes, None);

        let updated = reload_assessment(&db, assessment.id).await?;
        assert!(updated.step2_completed);
        assert!(!updated.step1_completed);
        assert!(!updated.step3_completed);
        assert!(!updated.step4_completed);
        assert!(!updated.step5_completed);
        assert!(updated.updated_at >= assessment.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_step_ignores_goals_outside_subset() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;

        let submission = StepSubmission::new()
            .with(1, Some(5), "")
            .with(13, Some(2), "")
            .with(17, Some(4), "");
        submit_step(&db, &project.user_id, assessment.id, Step::Three, &submission).await?;

        assert!(get_scores(&db, assessment.id).await?.is_empty());
        assert!(reload_assessment(&db, assessment.id).await?.step3_completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_score_outside_subset_is_ignored() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;

        let submission =
            StepSubmission::from_form(&form(&[("score_7", "3"), ("score_1", "abc")]));
        let next = submit_step(&db, &project.user_id, assessment.id, Step::Three, &submission).await?;
        assert_eq!(next.path(project.id), step_path(project.id, Step::Four, assessment.id));

        let scores = get_scores(&db, assessment.id).await?;
        assert_eq!(scores.keys().copied().collect::<Vec<_>>(), vec![7]);
        assert_eq!(scores[&7].score, Some(3));
        assert!(reload_assessment(&db, assessment.id).await?.step3_completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_score_keeps_previous_value() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;

        let first = StepSubmission::new().with(13, Some(4), "heat pumps");
        submit_step(&db, &project.user_id, assessment.id, Step::Four, &first).await?;

        let blank = StepSubmission::new().with(13, None, "changed my mind");
        submit_step(&db, &project.user_id, assessment.id, Step::Four, &blank).await?;

        let scores = get_scores(&db, assessment.id).await?;
        assert_eq!(scores[&13].score, Some(4));
        assert_eq!(scores[&13].notes.as_deref(), Some("heat pumps"));
        Ok(())
    }

    #[tokio::test]
    async fn test_last_step_routes_to_results() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;

        let submission = StepSubmission::new().with(16, Some(5), "").with(17, Some(2), "");
        let next = submit_step(&db, &project.user_id, assessment.id, Step::Five, &submission).await?;

        assert_eq!(next, NextRoute::Results { assessment_id: assessment.id });
        assert_eq!(next.path(project.id), format!("/assessments/{}", assessment.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_step_forbidden_performs_no_mutation() -> Result<()> {
        let (db, _project, assessment) = setup_with_assessment().await?;

        let submission = StepSubmission::new().with(1, Some(4), "");
        let result = submit_step(&db, "mallory", assessment.id, Step::One, &submission).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));

        assert!(get_scores(&db, assessment.id).await?.is_empty());
        assert!(!reload_assessment(&db, assessment.id).await?.step1_completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_step_unknown_assessment() -> Result<()> {
        let db = setup_test_db().await?;
        let result = submit_step(&db, "alice", 404, Step::One, &StepSubmission::new()).await;
        assert!(matches!(result, Err(Error::AssessmentNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_score_rolls_back_whole_step() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;

        let submission = StepSubmission::new().with(1, Some(4), "").with(2, Some(9), "");
        let result = submit_step(&db, &project.user_id, assessment.id, Step::One, &submission).await;
        assert!(matches!(result, Err(Error::InvalidScore { goal: 2, .. })));

        assert!(get_scores(&db, assessment.id).await?.is_empty());
        assert!(!reload_assessment(&db, assessment.id).await?.step1_completed);
        Ok(())
    }
}
