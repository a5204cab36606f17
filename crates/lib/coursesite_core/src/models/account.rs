//! Account domain models.
//!
//! `Account` mirrors a row of the `accounts` table; `SessionClaims` is the
//! verified payload of a session token and is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course website account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    /// bcrypt hash; `None` until setup is completed.
    pub password_hash: Option<String>,
    pub is_admin: bool,
    /// Present only while awaiting first-time setup or a reset.
    pub setup_token: Option<String>,
    pub setup_token_expiry: Option<DateTime<Utc>>,
    pub is_setup: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether the account still waits for its first password.
    pub fn is_pending(&self) -> bool {
        !self.is_setup
    }
}

/// Claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account ID.
    pub sub: i64,
    pub email: String,
    pub is_admin: bool,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Not before (unix timestamp).
    pub nbf: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
