use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Workflow-level failure taxonomy. Handlers return this instead of
/// propagating storage errors, so callers can match on the variant and
/// clients never see a raw stack trace.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("attendance for matric number '{matric_no}' has already been recorded")]
    DuplicateRecord { matric_no: String, deactivated: bool },

    // One message for unknown username, wrong password and deactivated
    // account, so usernames cannot be enumerated.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("please login to access this page")]
    Unauthenticated,

    #[error("this action requires the {0} role")]
    Forbidden(&'static str),

    #[error("record {0} not found")]
    NotFound(i32),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage failure")]
    Storage(#[from] DbErr),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateUsername(_) | ApiError::DuplicateRecord { .. } => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::DuplicateUsername(_) => "USERNAME_ALREADY_EXISTS",
            ApiError::DuplicateRecord { .. } => "DUPLICATE_RECORD",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Unauthenticated => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Storage(_) => "DATABASE_ERROR",
        }
    }

    fn user_message(&self) -> String {
        match self {
            // Storage details are logged, never surfaced
            ApiError::Storage(_) => "internal storage failure".to_string(),
            ApiError::Internal(_) => "internal server error".to_string(),
            ApiError::DuplicateRecord { deactivated: true, .. } => format!(
                "{self} and the record is deactivated; please contact an administrator"
            ),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage(db_error) => {
                error!("storage failure at workflow boundary: {}", db_error);
            }
            ApiError::Internal(detail) => {
                error!("internal error at workflow boundary: {}", detail);
            }
            _ => {}
        }

        let body = ErrorResponse {
            error: self.user_message(),
            code: self.code().to_string(),
            success: false,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Best-effort detection of a unique-constraint violation across the
/// backends sea-orm can sit on. Used to map racing duplicate inserts
/// onto the duplicate variants instead of a 500.
pub fn is_unique_violation(err: &DbErr) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("unique") || message.contains("duplicate")
}
