//! Unified error type for the assessment service.
//!
//! Every fallible operation in `core` returns [`Result`]. Callers at the boundary
//! use [`Error::kind`] to decide how to recover (not found, forbidden, bad input)
//! without matching on individual variants.

use thiserror::Error;

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced project does not exist
    #[error("Project not found: {id}")]
    ProjectNotFound {
        /// Project id that was looked up
        id: i64,
    },

    /// Referenced assessment does not exist (or is not attached to the given project)
    #[error("Assessment not found: {id}")]
    AssessmentNotFound {
        /// Assessment id that was looked up
        id: i64,
    },

    /// Project has no assessment yet, so a later step cannot be resumed
    #[error("Project {project_id} has no assessment")]
    NoAssessmentForProject {
        /// Project that was looked up
        project_id: i64,
    },

    /// Referenced goal is not one of the 17 SDGs
    #[error("Goal not found: {number}")]
    GoalNotFound {
        /// Goal number that was looked up
        number: i32,
    },

    /// Caller does not own the project the operation targets
    #[error("User {user_id} does not have access to project {project_id}")]
    Forbidden {
        /// Identity of the caller
        user_id: String,
        /// Project the caller tried to reach
        project_id: i64,
    },

    /// Submitted score is not an integer within the accepted range
    #[error("Invalid score for goal {goal}: {value}")]
    InvalidScore {
        /// Goal number the score was submitted for
        goal: i32,
        /// Raw submitted value
        value: String,
    },

    /// Step number outside 1..=5
    #[error("Invalid assessment step: {step}")]
    InvalidStep {
        /// Raw step value
        step: String,
    },

    /// Any other malformed input
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// Settings file unreadable or malformed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] used at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced project, assessment or goal does not exist
    NotFound,
    /// The caller does not own the referenced resource
    Forbidden,
    /// The request carried malformed input
    Validation,
    /// Storage, configuration or I/O failure
    Internal,
}

impl Error {
    /// Maps the error onto the user-recoverable taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectNotFound { .. }
            | Self::AssessmentNotFound { .. }
            | Self::NoAssessmentForProject { .. }
            | Self::GoalNotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidScore { .. } | Self::InvalidStep { .. } | Self::Validation { .. } => {
                ErrorKind::Validation
            }
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::ProjectNotFound { id: 1 }.kind(), ErrorKind::NotFound);
        assert_eq!(Error::AssessmentNotFound { id: 1 }.kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::NoAssessmentForProject { project_id: 3 }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::Forbidden {
                user_id: "alice".to_string(),
                project_id: 1,
            }
            .kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            Error::InvalidScore {
                goal: 3,
                value: "abc".to_string(),
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::Config {
                message: "bad".to_string(),
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Error::InvalidScore {
            goal: 7,
            value: "9".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid score for goal 7: 9");
        assert_eq!(
            Error::NoAssessmentForProject { project_id: 12 }.to_string(),
            "Project 12 has no assessment"
        );
    }
}
