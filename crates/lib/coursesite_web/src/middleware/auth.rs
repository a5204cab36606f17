//! Access guard: session cookie verification and admin checks.
//!
//! Policies are plain functions returning an [`AccessDecision`] and compose
//! by chaining: `authorize_admin(authenticate(..))`. The axum middleware
//! only turns the final decision into a response.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use coursesite_core::auth::session::SessionKeys;
use coursesite_core::models::account::SessionClaims;

use crate::AppState;
use crate::config::AuthMode;
use crate::error::AppError;
use crate::services::cookies::SESSION_COOKIE;

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

pub const ADMIN_REQUIRED: &str = "Access denied: admin required";

/// Outcome of an access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Proceed; claims are absent only when auth is disabled.
    Allow(Option<SessionClaims>),
    /// Not signed in: navigate elsewhere.
    Redirect(&'static str),
    /// Signed in but not permitted.
    Deny(&'static str),
}

/// Verified session claims, stored in request extensions by the guard.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionClaims);

/// `requireAuthenticated` as a pure decision.
pub fn authenticate(token: Option<&str>, keys: &SessionKeys, mode: AuthMode) -> AccessDecision {
    if mode == AuthMode::Disabled {
        return AccessDecision::Allow(None);
    }
    match token.map(|t| keys.verify(t)) {
        Some(Ok(claims)) => AccessDecision::Allow(Some(claims)),
        _ => AccessDecision::Redirect(LOGIN_PATH),
    }
}

/// Narrow an authenticated decision to administrators.
pub fn authorize_admin(decision: AccessDecision) -> AccessDecision {
    match decision {
        AccessDecision::Allow(Some(claims)) if !claims.is_admin => {
            AccessDecision::Deny(ADMIN_REQUIRED)
        }
        other => other,
    }
}

fn session_token(request: &Request) -> Option<String> {
    CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

async fn enforce(decision: AccessDecision, mut request: Request, next: Next) -> Response {
    match decision {
        AccessDecision::Allow(claims) => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(AuthenticatedUser(claims));
            }
            next.run(request).await
        }
        AccessDecision::Redirect(to) => Redirect::to(to).into_response(),
        AccessDecision::Deny(reason) => AppError::Unauthorized(reason.into()).into_response(),
    }
}

/// Axum middleware: signed-in users only, others are redirected to the login page.
pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = session_token(&request);
    let decision = authenticate(token.as_deref(), &state.sessions, state.config.auth);
    enforce(decision, request, next).await
}

/// Axum middleware: administrators only.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = session_token(&request);
    let decision = authorize_admin(authenticate(
        token.as_deref(),
        &state.sessions,
        state.config.auth,
    ));
    enforce(decision, request, next).await
}

/// The signed-in user, if any. Never rejects.
///
/// Behind the guard this reads the claims it stored; on public routes the
/// cookie is verified directly.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionClaims>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(AuthenticatedUser(claims)) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Self(Some(claims.clone())));
        }
        let claims = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .and_then(|c| state.sessions.verify(c.value()).ok());
        Ok(Self(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coursesite_core::models::account::Account;

    fn account(is_admin: bool) -> Account {
        let now = Utc::now();
        Account {
            id: 7,
            email: "a@x.com".into(),
            password_hash: None,
            is_admin,
            setup_token: None,
            setup_token_expiry: None,
            is_setup: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn keys() -> SessionKeys {
        SessionKeys::from_secret(b"guard-test-secret")
    }

    #[test]
    fn missing_or_bad_token_redirects_to_login() {
        let keys = keys();
        assert_eq!(
            AccessDecision::Redirect(LOGIN_PATH),
            authenticate(None, &keys, AuthMode::Enforced)
        );
        assert_eq!(
            AccessDecision::Redirect(LOGIN_PATH),
            authenticate(Some("garbage"), &keys, AuthMode::Enforced)
        );
    }

    #[test]
    fn valid_token_allows_with_claims() {
        let keys = keys();
        let token = keys.issue(&account(false)).unwrap();
        match authenticate(Some(&token), &keys, AuthMode::Enforced) {
            AccessDecision::Allow(Some(claims)) => assert_eq!(7, claims.sub),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn admin_check_denies_non_admins_but_keeps_redirects() {
        let keys = keys();
        let user = keys.issue(&account(false)).unwrap();
        let admin = keys.issue(&account(true)).unwrap();

        assert_eq!(
            AccessDecision::Deny(ADMIN_REQUIRED),
            authorize_admin(authenticate(Some(&user), &keys, AuthMode::Enforced))
        );
        assert!(matches!(
            authorize_admin(authenticate(Some(&admin), &keys, AuthMode::Enforced)),
            AccessDecision::Allow(Some(_))
        ));
        assert_eq!(
            AccessDecision::Redirect(LOGIN_PATH),
            authorize_admin(authenticate(None, &keys, AuthMode::Enforced))
        );
    }

    #[test]
    fn disabled_mode_bypasses_both_checks() {
        let keys = keys();
        assert_eq!(
            AccessDecision::Allow(None),
            authorize_admin(authenticate(None, &keys, AuthMode::Disabled))
        );
    }
}
