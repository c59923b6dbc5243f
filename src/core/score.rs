//! Score store - persistent mapping from (assessment, goal) to a score and note.
//!
//! All functions are generic over [`ConnectionTrait`] so they can run inside the
//! transaction opened by the step processor or by finalization.

use crate::{
    entities::{Score, score},
    errors::Result,
};
use sea_orm::{Set, prelude::*};
use std::collections::BTreeMap;
use tracing::debug;

/// Inserts or updates the score entry for `(assessment_id, goal_id)`.
///
/// An existing entry has its score, note and `updated_at` overwritten in place;
/// otherwise a new entry is created with `created_at = updated_at = now`.
pub async fn upsert_score<C>(
    db: &C,
    assessment_id: i64,
    goal_id: i32,
    value: i32,
    note: Option<String>,
) -> Result<score::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let existing = Score::find()
        .filter(score::Column::AssessmentId.eq(assessment_id))
        .filter(score::Column::GoalId.eq(goal_id))
        .one(db)
        .await?;

    let entry = if let Some(existing) = existing {
        debug!(assessment_id, goal_id, value, "Updating score");
        let mut active: score::ActiveModel = existing.into();
        active.score = Set(Some(value));
        active.notes = Set(note);
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        debug!(assessment_id, goal_id, value, "Recording new score");
        score::ActiveModel {
            assessment_id: Set(assessment_id),
            goal_id: Set(goal_id),
            score: Set(Some(value)),
            notes: Set(note),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };
    Ok(entry)
}

/// Returns every recorded entry for an assessment, keyed by goal number.
pub async fn get_scores<C>(db: &C, assessment_id: i64) -> Result<BTreeMap<i32, score::Model>>
where
    C: ConnectionTrait,
{
    Ok(Score::find()
        .filter(score::Column::AssessmentId.eq(assessment_id))
        .all(db)
        .await?
        .into_iter()
        .map(|entry| (entry.goal_id, entry))
        .collect())
}

/// Mean of all non-null scores; `0.0` when nothing has been scored.
///
/// Every scored goal weighs the same no matter how many of the 17 were scored.
#[must_use]
pub fn mean_score<'a, I>(entries: I) -> f64
where
    I: IntoIterator<Item = &'a score::Model>,
{
    let (total, count) = entries
        .into_iter()
        .filter_map(|entry| entry.score)
        .fold((0_i64, 0_u32), |(total, count), value| {
            (total + i64::from(value), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)] // sums of at most 17 small integers
        let total = total as f64;
        total / f64::from(count)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn entry(goal_id: i32, value: Option<i32>) -> score::Model {
        let now = chrono::Utc::now();
        score::Model {
            id: i64::from(goal_id),
            assessment_id: 1,
            goal_id,
            score: value,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_mean_score() {
        let entries = vec![entry(1, Some(4)), entry(2, Some(5)), entry(3, Some(3))];
        assert_eq!(mean_score(&entries), 4.0);
    }

    #[test]
    fn test_mean_score_empty_is_zero() {
        assert_eq!(mean_score(&Vec::<score::Model>::new()), 0.0);
    }

    #[test]
    fn test_mean_score_ignores_null_scores() {
        let entries = vec![entry(1, Some(2)), entry(2, None), entry(3, Some(4))];
        assert_eq!(mean_score(&entries), 3.0);

        let only_null = vec![entry(1, None)];
        assert_eq!(mean_score(&only_null), 0.0);
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() -> Result<()> {
        let (db, _project, assessment) = setup_with_assessment().await?;

        let first = upsert_score(&db, assessment.id, 7, 3, Some("solar".to_string())).await?;
        assert_eq!(first.score, Some(3));
        assert_eq!(first.created_at, first.updated_at);

        let second = upsert_score(&db, assessment.id, 7, 5, Some("solar + storage".to_string())).await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.score, Some(5));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        let scores = get_scores(&db, assessment.id).await?;
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&7].notes.as_deref(), Some("solar + storage"));
        Ok(())
    }

    #[tokio::test]
    async fn test_resubmitting_keeps_only_latest_note() -> Result<()> {
        let (db, _project, assessment) = setup_with_assessment().await?;

        upsert_score(&db, assessment.id, 1, 4, Some("first".to_string())).await?;
        upsert_score(&db, assessment.id, 1, 4, Some("second".to_string())).await?;

        let scores = get_scores(&db, assessment.id).await?;
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&1].notes.as_deref(), Some("second"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_scores_is_scoped_to_assessment() -> Result<()> {
        let (db, project, assessment) = setup_with_assessment().await?;
        let other = create_test_assessment(&db, project.id).await?;

        upsert_score(&db, assessment.id, 1, 2, None).await?;
        upsert_score(&db, assessment.id, 2, 3, None).await?;
        upsert_score(&db, other.id, 1, 5, None).await?;

        let scores = get_scores(&db, assessment.id).await?;
        assert_eq!(scores.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(scores[&1].score, Some(2));

        let other_scores = get_scores(&db, other.id).await?;
        assert_eq!(other_scores.len(), 1);
        assert_eq!(other_scores[&1].score, Some(5));
        Ok(())
    }
}
