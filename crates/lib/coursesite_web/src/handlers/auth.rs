//! Login, logout, account setup and password changes.

use axum::Form;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use coursesite_core::auth::password::{MIN_PASSWORD_LEN, hash_password};
use coursesite_core::auth::{AuthError, accounts, credentials};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{CurrentUser, LOGIN_PATH};
use crate::services::cookies::{clear_session_cookie, session_cookie};
use crate::views::{self, SetupView};

const INVALID_LOGIN: &str = "Invalid email or password";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// `GET /login`
pub async fn login_form(CurrentUser(user): CurrentUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(views::login_page(None, "")).into_response()
}

/// `POST /login`
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let email = form.email.trim();
    match credentials::validate_credentials(&state.pool, email, &form.password).await {
        Ok(account) => {
            let token = state.sessions.issue(&account)?;
            info!(email, "login");
            let jar = jar.add(session_cookie(&token, state.config.secure_cookies));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AuthError::CredentialError) => {
            info!(email, "failed login");
            Ok(Html(views::login_page(Some(INVALID_LOGIN), email)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /logout`
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(clear_session_cookie(state.config.secure_cookies));
    (jar, Redirect::to(LOGIN_PATH))
}

#[derive(Debug, Deserialize)]
pub struct SetupQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetupForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

fn query_token(query: &SetupQuery) -> AppResult<&str> {
    query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Missing setup token".into()))
}

/// `GET /setup?token=…`
pub async fn setup_form(
    State(state): State<AppState>,
    Query(query): Query<SetupQuery>,
) -> AppResult<Html<String>> {
    let token = query_token(&query)?;
    let page = match accounts::find_by_setup_token(&state.pool, token).await? {
        Some(account) => views::setup_page(SetupView::Form {
            token,
            email: &account.email,
            error: None,
        }),
        None => views::setup_page(SetupView::Invalid),
    };
    Ok(Html(page))
}

/// `POST /setup?token=…`
pub async fn setup_submit(
    State(state): State<AppState>,
    Query(query): Query<SetupQuery>,
    Form(form): Form<SetupForm>,
) -> AppResult<Response> {
    let token = query_token(&query)?;
    let Some(account) = accounts::find_by_setup_token(&state.pool, token).await? else {
        return Ok(Html(views::setup_page(SetupView::Invalid)).into_response());
    };

    let problem = if form.token != token {
        Some("Invalid token")
    } else if form.password.len() < MIN_PASSWORD_LEN {
        Some(PASSWORD_TOO_SHORT)
    } else if form.password != form.confirm_password {
        Some("Passwords do not match")
    } else {
        None
    };
    if let Some(error) = problem {
        let page = views::setup_page(SetupView::Form {
            token,
            email: &account.email,
            error: Some(error),
        });
        return Ok(Html(page).into_response());
    }

    let hash = hash_password(&form.password)?;
    match accounts::complete_setup(&state.pool, token, &hash).await {
        Ok(()) => {
            info!(email = %account.email, "account setup completed");
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(AuthError::InvalidOrExpiredToken) => {
            Ok(Html(views::setup_page(SetupView::Invalid)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// `GET /change-password`
pub async fn change_password_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Html<String> {
    Html(views::change_password_page(
        state.site.nav(),
        user.as_ref(),
        None,
        None,
    ))
}

/// `POST /change-password`
pub async fn change_password_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<Html<String>> {
    let render = |error: Option<&str>, success: Option<&str>| {
        Html(views::change_password_page(
            state.site.nav(),
            user.as_ref(),
            error,
            success,
        ))
    };

    let Some(claims) = user.as_ref() else {
        return Ok(render(Some("Sign in to change your password"), None));
    };

    let account =
        match credentials::validate_credentials(&state.pool, &claims.email, &form.current_password)
            .await
        {
            Ok(account) => account,
            Err(AuthError::CredentialError) => {
                return Ok(render(Some("Current password is incorrect"), None));
            }
            Err(e) => return Err(e.into()),
        };

    if form.new_password.len() < MIN_PASSWORD_LEN {
        return Ok(render(Some(PASSWORD_TOO_SHORT), None));
    }
    if form.new_password != form.confirm_password {
        return Ok(render(Some("New passwords do not match"), None));
    }
    if form.new_password == form.current_password {
        return Ok(render(
            Some("New password must be different from the current password"),
            None,
        ));
    }

    let hash = hash_password(&form.new_password)?;
    accounts::set_password(&state.pool, account.id, &hash).await?;
    info!(email = %account.email, "password changed");
    Ok(render(None, Some("Password changed successfully")))
}
