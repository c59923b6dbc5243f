//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod assessment;
pub mod goal;
pub mod project;
pub mod score;

// Re-export specific types to avoid conflicts
pub use assessment::{
    Column as AssessmentColumn, Entity as Assessment, Model as AssessmentModel,
};
pub use goal::{Column as GoalColumn, Entity as Goal, Model as GoalModel};
pub use project::{Column as ProjectColumn, Entity as Project, Model as ProjectModel};
pub use score::{Column as ScoreColumn, Entity as Score, Model as ScoreModel};
