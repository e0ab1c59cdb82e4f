//! Application error types.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};
use wastewise_core::auth::AuthError;
use wastewise_core::auth::policy::PolicyError;
use wastewise_core::store::StoreError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Conflict(m) => (StatusCode::BAD_REQUEST, "conflict", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Corrupt(msg) => AppError::Internal(msg),
            StoreError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => {
                AppError::Unauthorized("Invalid email or password".into())
            }
            AuthError::MissingToken => AppError::Unauthorized("Not authorized, no token".into()),
            AuthError::Revoked => {
                AppError::Unauthorized("Token is blacklisted. Please log in again.".into())
            }
            AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Not authorized, invalid token".into())
            }
            AuthError::LookupTimeout => AppError::Unauthorized("Not authorized".into()),
            AuthError::PrincipalNotFound => AppError::NotFound("Account not found".into()),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Store(e) => AppError::from(e),
            AuthError::MissingSecret => AppError::Internal("signing secret missing".into()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Unreadable or mistyped bodies are validation failures. The parser's
/// detail stays in the log.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "request body rejected");
        AppError::Validation("Invalid request body".into())
    }
}

impl From<PolicyError> for AppError {
    fn from(e: PolicyError) -> Self {
        AppError::Forbidden(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_failures_are_unauthorized() {
        for e in [
            AuthError::MissingToken,
            AuthError::Revoked,
            AuthError::InvalidToken("bad signature".into()),
            AuthError::LookupTimeout,
            AuthError::CredentialError,
        ] {
            let resp = AppError::from(e).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn invalid_token_detail_is_not_leaked() {
        let err = AppError::from(AuthError::InvalidToken("InvalidSignature".into()));
        assert!(!err.to_string().contains("InvalidSignature"));
    }

    #[test]
    fn conflict_is_bad_request() {
        let resp = AppError::from(StoreError::Conflict("email".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn policy_denial_is_forbidden() {
        let err = PolicyError::Forbidden(wastewise_core::auth::policy::Operation::ViewAnalytics);
        assert_eq!(
            AppError::from(err).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
