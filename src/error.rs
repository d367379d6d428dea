use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::users::dto::ApiResponse;

/// Domain error taxonomy. Carries no transport codes; the `IntoResponse`
/// impl below is the single place they are assigned.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid user ID format")]
    InvalidId,

    #[error("{0}")]
    InvalidData(String),

    #[error("User not found")]
    NotFound,

    #[error("User with this email or username already exists")]
    Duplicate,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            UserError::InvalidId | UserError::InvalidData(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            UserError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            UserError::Duplicate => (StatusCode::CONFLICT, self.to_string()),
            UserError::Database(ref detail) | UserError::Internal(ref detail) => {
                // Full detail stays in the logs; the caller gets a generic message.
                tracing::error!(error = %detail, "unexpected error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
