//! Application error types.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use coursesite_core::auth::AuthError;
use thiserror::Error;
use tracing::{debug, error};

use crate::views;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rendered exactly like [`AppError::NotFound`].
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Signed in but not an administrator.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "Bad request", m.as_str()),
            AppError::NotFound(reason) | AppError::Forbidden(reason) => {
                debug!(%reason, "not found");
                (
                    StatusCode::NOT_FOUND,
                    "Page not found",
                    "The page you requested does not exist.",
                )
            }
            AppError::Unauthorized(m) => (StatusCode::FORBIDDEN, "Access denied", m.as_str()),
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Internal server error",
                )
            }
        };
        (status, Html(views::error_page(title, message))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Validation("Invalid email or password".into()),
            AuthError::InvalidToken => AppError::Validation("Invalid session".into()),
            AuthError::InvalidOrExpiredToken => {
                AppError::Validation("Invalid or expired setup token".into())
            }
            AuthError::Conflict(email) => {
                AppError::Validation(format!("User with email {email} already exists"))
            }
            AuthError::NotFound(what) => AppError::NotFound(what),
            AuthError::AlreadySetUp(_) => {
                AppError::Validation("User has already completed setup".into())
            }
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::Db(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
