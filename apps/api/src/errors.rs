use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assist::AssistError;
use crate::layout::{LayoutError, Section};
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("AI error: {0}")]
    Assist(#[from] AssistError),

    /// The edit was computed but not persisted. `snapshot` is the layout the
    /// client must revert to.
    #[error("Persistence failure: {message}")]
    Persistence {
        message: String,
        snapshot: Vec<Section>,
    },
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Layout(e) => match e {
                LayoutError::LimitReached { .. } => {
                    (StatusCode::CONFLICT, "LIMIT_REACHED", e.to_string())
                }
                LayoutError::SectionNotFound(_) => {
                    (StatusCode::NOT_FOUND, "SECTION_NOT_FOUND", e.to_string())
                }
                LayoutError::NotSameRow { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                LayoutError::InvariantViolation(_) => {
                    tracing::error!("Refused edit on malformed layout: {e}");
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "INVARIANT_VIOLATION",
                        e.to_string(),
                    )
                }
            },
            AppError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Project {id} not found"),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Assist(AssistError::EmptyPrompt) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                AssistError::EmptyPrompt.to_string(),
            ),
            AppError::Assist(AssistError::MalformedLayout(msg)) => {
                tracing::error!("Rejected AI layout: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_MALFORMED_RESPONSE",
                    "The AI returned a layout that could not be used".to_string(),
                )
            }
            AppError::Assist(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Persistence { message, .. } => {
                tracing::error!("Persistence failure: {message}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_FAILURE",
                    "Changes could not be saved. Please try again.".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Persistence { snapshot, .. } = &self {
            error["snapshot"] = json!(snapshot);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ProjectType;

    #[test]
    fn test_limit_reached_maps_to_conflict() {
        let err = AppError::from(LayoutError::LimitReached {
            project_type: ProjectType::Resume,
            max: 8,
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "LIMIT_REACHED");
        assert!(message.contains('8'));
    }

    #[test]
    fn test_missing_project_maps_to_not_found() {
        let err = AppError::from(StoreError::NotFound(uuid::Uuid::nil()));
        assert_eq!(err.parts().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_persistence_failure_is_unavailable() {
        let err = AppError::Persistence {
            message: "down".into(),
            snapshot: vec![],
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
