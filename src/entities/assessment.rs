//! Assessment entity - One run of the five-step scoring wizard against a project.
//!
//! Holds the per-step completion flags, the lifecycle status (`"draft"` or
//! `"completed"`) and, once finalized, the aggregate `overall_score`.
//! `overall_score` and `completed_at` are only populated on completed assessments.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assessment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    /// Unique identifier for the assessment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project this assessment belongs to
    pub project_id: i64,
    /// Assessment version, starts at 1
    pub version: i32,
    /// Lifecycle status: `"draft"` or `"completed"`
    pub status: String,
    /// Step 1 (goals 1, 2, 3, 6) submitted
    pub step1_completed: bool,
    /// Step 2 (goals 4, 5, 8, 10) submitted
    pub step2_completed: bool,
    /// Step 3 (goals 7, 9, 11, 12) submitted
    pub step3_completed: bool,
    /// Step 4 (goals 13, 14, 15) submitted
    pub step4_completed: bool,
    /// Step 5 (goals 16, 17) submitted
    pub step5_completed: bool,
    /// Mean of all recorded scores, set on finalization
    pub overall_score: Option<f64>,
    /// When the assessment was finalized
    pub completed_at: Option<DateTimeUtc>,
    /// When the assessment was created
    pub created_at: DateTimeUtc,
    /// When the assessment was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Assessment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assessment belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    /// One assessment has many score entries
    #[sea_orm(has_many = "super::score::Entity")]
    Scores,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::score::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
