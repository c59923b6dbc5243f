//! Shared test utilities for the assessment service.
//!
//! Helpers for setting up in-memory databases and creating projects and
//! assessments with sensible defaults.

use crate::{
    core::{
        assessment::{self, get_assessment_by_id},
        goal::seed_goals,
        project::{self, NewProject},
    },
    entities,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables but no goal rows.
pub async fn setup_empty_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an in-memory `SQLite` database with all tables and the 17 goals seeded.
/// This is the standard setup for integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = setup_empty_db().await?;
    seed_goals(&db).await?;
    Ok(db)
}

/// Creates a test project owned by `user_id`.
///
/// # Defaults
/// * `name`: "Test Project"
/// * `location`: "Test City"
/// * `size_sqm`: 500.0
pub async fn create_test_project(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::project::Model> {
    project::create_project(
        db,
        user_id,
        NewProject {
            name: "Test Project".to_string(),
            location: Some("Test City".to_string()),
            size_sqm: Some(500.0),
            ..Default::default()
        },
    )
    .await
}

/// Creates a fresh draft assessment for a project.
pub async fn create_test_assessment(
    db: &DatabaseConnection,
    project_id: i64,
) -> Result<entities::assessment::Model> {
    assessment::create_assessment(db, project_id).await
}

/// Sets up a seeded database with a project owned by `"alice"` and one draft assessment.
/// Returns (db, project, assessment).
pub async fn setup_with_assessment() -> Result<(
    DatabaseConnection,
    entities::project::Model,
    entities::assessment::Model,
)> {
    let db = setup_test_db().await?;
    let project = create_test_project(&db, "alice").await?;
    let assessment = create_test_assessment(&db, project.id).await?;
    Ok((db, project, assessment))
}

/// Re-reads an assessment from the database.
pub async fn reload_assessment(
    db: &DatabaseConnection,
    assessment_id: i64,
) -> Result<entities::assessment::Model> {
    get_assessment_by_id(db, assessment_id)
        .await?
        .ok_or(Error::AssessmentNotFound { id: assessment_id })
}
