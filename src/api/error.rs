//! HTTP error responses.
//!
//! Core errors are mapped by their [`ErrorKind`] onto status codes and rendered as a
//! JSON body `{"error": ..., "code": ...}`. Internal failures are logged and their
//! details are not exposed to the client.

use crate::errors::{Error, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Error from the core layer
    #[error(transparent)]
    Core(#[from] Error),

    /// Request carried no caller identity
    #[error("Missing caller identity")]
    Unauthenticated,
}

/// Handler result alias.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            Self::Core(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
                ErrorKind::Validation => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    err.to_string(),
                ),
                ErrorKind::Internal => {
                    tracing::error!(error = %err, "Internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                ApiError::from(Error::AssessmentNotFound { id: 4 }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(Error::Forbidden {
                    user_id: "bob".to_string(),
                    project_id: 1,
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(Error::InvalidStep {
                    step: "step9".to_string(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(Error::Config {
                    message: "secret path".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let error = ApiError::from(Error::Config {
            message: "secret path".to_string(),
        });
        let (_, code, message) = error.parts();
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("secret"));
    }
}
