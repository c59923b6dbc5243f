//! Project business logic - the minimal project lifecycle the assessment workflow needs.
//!
//! Projects are owned by a single user. Every assessment operation first resolves its
//! project through [`get_owned_project`], which is where the not-found/forbidden
//! distinction is made.

use crate::{
    entities::{Project, project},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Descriptive fields supplied when creating a project.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct NewProject {
    /// Project name, required
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Kind of project
    pub project_type: Option<String>,
    /// Where the project is located
    pub location: Option<String>,
    /// Floor area in square metres
    pub size_sqm: Option<f64>,
}

/// Checks the descriptive fields and returns the trimmed name.
///
/// The name must not be empty; a negative or non-finite size is rejected.
fn validate_fields(fields: &NewProject) -> Result<String> {
    let name = fields.name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Project name cannot be empty".to_string(),
        });
    }
    if let Some(size) = fields.size_sqm {
        if !size.is_finite() || size < 0.0 {
            return Err(Error::Validation {
                message: format!("Invalid project size: {size}"),
            });
        }
    }
    Ok(name.to_string())
}

/// Creates a project owned by `user_id`.
pub async fn create_project(
    db: &DatabaseConnection,
    user_id: &str,
    new_project: NewProject,
) -> Result<project::Model> {
    let name = validate_fields(&new_project)?;

    let now = chrono::Utc::now();
    let project = project::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name),
        description: Set(new_project.description),
        project_type: Set(new_project.project_type),
        location: Set(new_project.location),
        size_sqm: Set(new_project.size_sqm),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = project.insert(db).await?;
    info!(project_id = result.id, user_id, "Created project");
    Ok(result)
}

/// Replaces the descriptive fields of a project owned by `user_id`.
///
/// Validation matches [`create_project`]; the owner and `created_at` never change.
#[instrument(skip(db, fields))]
pub async fn update_project(
    db: &DatabaseConnection,
    user_id: &str,
    project_id: i64,
    fields: NewProject,
) -> Result<project::Model> {
    let name = validate_fields(&fields)?;
    let existing = get_owned_project(db, user_id, project_id).await?;

    let mut active: project::ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(fields.description);
    active.project_type = Set(fields.project_type);
    active.location = Set(fields.location);
    active.size_sqm = Set(fields.size_sqm);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!("Updated project");
    Ok(updated)
}

/// Finds a project by id regardless of owner.
pub async fn get_project_by_id<C>(db: &C, project_id: i64) -> Result<Option<project::Model>>
where
    C: ConnectionTrait,
{
    Project::find_by_id(project_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a project and checks that `user_id` owns it.
///
/// # Errors
/// * `ProjectNotFound` if the project does not exist
/// * `Forbidden` if it belongs to another user
pub async fn get_owned_project<C>(db: &C, user_id: &str, project_id: i64) -> Result<project::Model>
where
    C: ConnectionTrait,
{
    let project = get_project_by_id(db, project_id)
        .await?
        .ok_or(Error::ProjectNotFound { id: project_id })?;
    ensure_owner(&project, user_id)?;
    Ok(project)
}

/// Fails with `Forbidden` unless `user_id` owns `project`.
pub fn ensure_owner(project: &project::Model, user_id: &str) -> Result<()> {
    if project.user_id == user_id {
        Ok(())
    } else {
        Err(Error::Forbidden {
            user_id: user_id.to_string(),
            project_id: project.id,
        })
    }
}

/// Lists a user's projects, newest first.
pub async fn get_projects_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<project::Model>> {
    Project::find()
        .filter(project::Column::UserId.eq(user_id))
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a project owned by `user_id`.
///
/// Its assessments and their scores go with it through the `ON DELETE CASCADE`
/// foreign keys, so a single statement removes the whole tree.
#[instrument(skip(db))]
pub async fn delete_project(db: &DatabaseConnection, user_id: &str, project_id: i64) -> Result<()> {
    let project = get_owned_project(db, user_id, project_id).await?;
    project.delete(db).await?;
    info!("Deleted project and its assessments");
    Ok(())
}
