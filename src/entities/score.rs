//! Score entity - A single (assessment, goal) rating with an optional note.
//!
//! The `(assessment_id, goal_id)` pair is unique and acts as the upsert key.
//! Entries are removed only by cascade when their assessment is deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Score database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sdg_scores")]
pub struct Model {
    /// Unique identifier for the score entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Assessment this score belongs to
    pub assessment_id: i64,
    /// Goal number being scored
    pub goal_id: i32,
    /// Score value, `None` for legacy rows recorded without one
    pub score: Option<i32>,
    /// Free-text note
    pub notes: Option<String>,
    /// When the entry was first recorded
    pub created_at: DateTimeUtc,
    /// When the entry was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Score and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each score belongs to one assessment
    #[sea_orm(
        belongs_to = "super::assessment::Entity",
        from = "Column::AssessmentId",
        to = "super::assessment::Column::Id",
        on_delete = "Cascade"
    )]
    Assessment,
    /// Each score refers to one goal
    #[sea_orm(
        belongs_to = "super::goal::Entity",
        from = "Column::GoalId",
        to = "super::goal::Column::Id"
    )]
    Goal,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::goal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
