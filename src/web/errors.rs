//! # API Error Handling
//!
//! Maps engine errors onto HTTP statuses: validation failures are 400,
//! unknown workflows 404, append conflicts 409, illegal transitions 422,
//! and everything else 500.

use crate::engine::EngineError;
use crate::event_store::EventStoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Wire shape for error responses
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::UnprocessableEntity(_) => "unprocessable_entity",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::WorkflowNotFound(id) => Self::NotFound(format!("workflow not found: {id}")),
            EngineError::WorkflowAlreadyExists(id) => {
                Self::Conflict(format!("workflow already exists: {id}"))
            }
            EngineError::Definition(err) => Self::BadRequest(err.to_string()),
            EngineError::StateMachine(err) => Self::UnprocessableEntity(err.to_string()),
            EngineError::Store(EventStoreError::ConcurrentAppendConflict { .. }) => {
                Self::Conflict(e.to_string())
            }
            EngineError::Store(EventStoreError::WorkflowNotFound(id)) => {
                Self::NotFound(format!("workflow not found: {id}"))
            }
            EngineError::Store(EventStoreError::EventLimitExceeded { .. }) => {
                Self::UnprocessableEntity(e.to_string())
            }
            EngineError::Store(_) | EngineError::Replay(_) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_engine_error_mapping() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(EngineError::WorkflowNotFound(id)),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(EngineError::Store(
                EventStoreError::ConcurrentAppendConflict {
                    workflow_id: id,
                    expected: 1,
                    actual: 2
                }
            )),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnprocessableEntity("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
