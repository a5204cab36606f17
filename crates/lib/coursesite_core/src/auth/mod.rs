//! Authentication and account management.
//!
//! Provides the account store, password hashing, setup and session tokens,
//! and credential validation shared by the web layer.

pub mod accounts;
pub mod credentials;
pub mod password;
pub mod session;
pub mod setup_token;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    /// Session token failed verification (bad signature, expired or malformed).
    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid or expired setup token")]
    InvalidOrExpiredToken,

    #[error("Account already exists: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The account finished setup; it no longer takes setup tokens.
    #[error("Account {0} has already completed setup")]
    AlreadySetUp(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
