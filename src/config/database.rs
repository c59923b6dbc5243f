//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including the cascading foreign keys declared on the relations) always
//! matches the Rust structs. The composite upsert key on scores and the lookup index on
//! assessments are added separately because they span more than one column.

use crate::entities::{Assessment, Goal, Project, Score, assessment, score};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::debug;

/// Fallback database location when neither the settings file nor `DATABASE_URL` names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/sdg_assessment.sqlite?mode=rwc";

/// File path of an on-disk `SQLite` URL, `None` for in-memory databases.
#[must_use]
pub fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}

/// Establishes a connection to the given database URL.
///
/// The parent directory of an on-disk `SQLite` file is created first. `SQLite`
/// connections opened through `sqlx` enforce foreign keys, which the cascade rules
/// on assessments and scores rely on.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Order matters: referenced tables are created before the tables holding foreign keys.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Goal).await?;
    create_table(db, &schema, Project).await?;
    create_table(db, &schema, Assessment).await?;
    create_table(db, &schema, Score).await?;

    let score_key = Index::create()
        .name("idx_sdg_scores_assessment_goal")
        .table(Score)
        .col(score::Column::AssessmentId)
        .col(score::Column::GoalId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&score_key)).await?;

    let assessment_project = Index::create()
        .name("idx_assessments_project_id")
        .table(Assessment)
        .col(assessment::Column::ProjectId)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&assessment_project)).await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(db.get_database_backend().build(&statement))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        assessment::Model as AssessmentModel, goal::Model as GoalModel,
        project::Model as ProjectModel, score::Model as ScoreModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<GoalModel> = Goal::find().limit(1).all(&db).await?;
        let _: Vec<ProjectModel> = Project::find().limit(1).all(&db).await?;
        let _: Vec<AssessmentModel> = Assessment::find().limit(1).all(&db).await?;
        let _: Vec<ScoreModel> = Score::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path(DEFAULT_DATABASE_URL),
            Some(Path::new("data/sdg_assessment.sqlite"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:/var/lib/sdg.db"),
            Some(Path::new("/var/lib/sdg.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/sdg"), None);
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
