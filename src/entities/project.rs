//! Project entity - A user-owned project that gets assessed against the SDGs.
//!
//! Only the owning user may read or mutate a project or anything below it.
//! Deleting a project cascades to its assessments (and from there to their scores).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier for the project
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the owning user, as supplied by the authentication layer
    pub user_id: String,
    /// Project name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Kind of project (e.g., "residential", "office")
    pub project_type: Option<String>,
    /// Where the project is located
    pub location: Option<String>,
    /// Floor area in square metres
    pub size_sqm: Option<f64>,
    /// When the project was created
    pub created_at: DateTimeUtc,
    /// When the project was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One project has many assessments
    #[sea_orm(has_many = "super::assessment::Entity")]
    Assessments,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
