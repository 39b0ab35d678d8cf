//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Store-side failures are logged in full and returned as a generic 500;
//! everything client-correctable carries its reason in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use reelstack_core::auth::AuthError;
use reelstack_core::CoreError;

use crate::db::{DbError, RepoError};
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Missing or rejected credentials (401)
    Unauthorized { reason: String },

    /// Resource already exists (409)
    Conflict { message: String },

    /// Connection cache failure (500, logged)
    Database(DbError),

    /// Query failure (500, logged)
    Query(RepoError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::Unauthorized { reason } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": reason
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message. A missing
                // DATABASE_URL is a deployment problem and logged as such.
                match e {
                    DbError::UrlMissing => tracing::error!("database not configured: {}", e),
                    DbError::Connect(_) => tracing::error!("database unavailable: {}", e),
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Query(e) => {
                tracing::error!("query error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self::Database(e)
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::EmailTaken => Self::Conflict {
                message: e.to_string(),
            },
            _ => Self::Query(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::TokenMalformed
            | AuthError::TokenSignature
            | AuthError::TokenExpired => Self::Unauthorized {
                reason: e.to_string(),
            },
            AuthError::Hash { .. } | AuthError::TokenEncoding { .. } => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self::Internal {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "email" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn email_taken_is_409() {
        let err = ApiError::from(RepoError::EmailTaken);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn token_errors_are_401() {
        for auth_err in [
            AuthError::InvalidCredentials,
            AuthError::TokenExpired,
            AuthError::TokenSignature,
        ] {
            let response = ApiError::from(auth_err).into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn database_errors_are_opaque_500s() {
        let err = ApiError::Database(DbError::UrlMissing);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        // The body must not leak configuration details
        assert_eq!(body["message"], "an internal error occurred");
    }
}
