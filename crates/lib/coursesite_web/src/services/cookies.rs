//! Session cookie helpers.

use axum_extra::extract::cookie::{Cookie, SameSite};
use coursesite_core::auth::session::SESSION_TTL_SECS;
use time::Duration;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "auth_token";

/// HttpOnly session cookie living as long as the token.
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Immediately-expiring cookie that clears the session.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, String::new()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok", false);
        let header = cookie.to_string();
        assert!(header.starts_with("auth_token=tok"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=86400"));
        assert!(!header.contains("Secure"));

        assert!(session_cookie("tok", true).to_string().contains("Secure"));
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let header = clear_session_cookie(false).to_string();
        assert!(header.starts_with("auth_token=;"));
        assert!(header.contains("Max-Age=0"));
    }
}
