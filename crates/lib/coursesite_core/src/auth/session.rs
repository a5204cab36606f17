//! Session token issuance and verification.
//!
//! Session tokens are HS256 JWTs carrying [`SessionClaims`]. Verification pins
//! the algorithm, applies no clock leeway, and collapses every failure into
//! [`AuthError::InvalidToken`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use super::AuthError;
use crate::models::account::{Account, SessionClaims};

/// Session lifetime: 24 hours.
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// Process-wide signing material for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    /// Build keys from a symmetric secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    /// Issue a session token for `account`, valid from now for 24 hours.
    pub fn issue(&self, account: &Account) -> Result<String, AuthError> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a session token as if at `issued_at`.
    pub fn issue_at(
        &self,
        account: &Account,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = issued_at.timestamp();
        let claims = SessionClaims {
            sub: account.id,
            email: account.email.clone(),
            is_admin: account.is_admin,
            iat,
            nbf: iat,
            exp: (issued_at + Duration::seconds(SESSION_TTL_SECS)).timestamp(),
        };
        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a session token, returning its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "session token rejected");
                AuthError::InvalidToken
            })
    }
}

/// Resolve the session secret: explicit value → `SESSION_SECRET` → persisted file.
pub fn resolve_session_secret(configured: Option<&str>) -> String {
    if let Some(secret) = configured
        && !secret.is_empty()
    {
        return secret.to_string();
    }
    if let Ok(secret) = std::env::var("SESSION_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = session_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(&secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new session secret"),
        Err(e) => warn!(
            path = %secret_path.display(),
            error = %e,
            "could not persist session secret; sessions end on restart"
        ),
    }
    secret
}

/// Path to the persisted session secret file.
fn session_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coursesite")
        .join("session-secret")
}
