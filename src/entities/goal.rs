//! Goal entity - The 17 UN Sustainable Development Goals.
//!
//! Goal rows are reference data: seeded once at startup from the static table in
//! `core::goal` and never mutated afterwards. The goal number doubles as the primary key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sdg_goals")]
pub struct Model {
    /// Goal number, 1 through 17
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Short display name (e.g., "No Poverty")
    pub name: String,
    /// One-sentence description of the goal
    pub description: String,
    /// Official SDG colour as a hex code (e.g., "#E5243B")
    pub color_code: String,
}

/// Defines relationships between Goal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One goal is scored in many assessments
    #[sea_orm(has_many = "super::score::Entity")]
    Scores,
}

impl Related<super::score::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
