//! Account administration (admin only).

use axum::Form;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Redirect};
use coursesite_core::auth::{AuthError, accounts};
use serde::Deserialize;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::services::accounts::{
    base_url, bulk_invite, invite, is_valid_email, send_setup_email, setup_url,
};
use crate::views;

const RESENT: &str = "/admin/manage-users?success=Setup+email+resent+successfully";
const RESEND_FAILED: &str =
    "/admin/manage-users?success=Setup+link+regenerated%2C+but+the+email+could+not+be+sent";

/// `GET /admin/add-users`
pub async fn add_users_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Html<String> {
    Html(views::add_users_page(state.site.nav(), user.as_ref(), None, None))
}

#[derive(Debug, Deserialize)]
pub struct AddUsersForm {
    #[serde(rename = "type")]
    pub kind: String,
    pub email: Option<String>,
    pub is_admin: Option<String>,
    pub emails: Option<String>,
    pub bulk_admin: Option<String>,
}

/// `POST /admin/add-users` with `type=single` or `type=bulk`.
pub async fn add_users_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    Form(form): Form<AddUsersForm>,
) -> AppResult<Html<String>> {
    let base = base_url(&state.config, &headers);
    let render = |error: Option<&str>, success: Option<&str>| {
        Html(views::add_users_page(state.site.nav(), user.as_ref(), error, success))
    };

    match form.kind.as_str() {
        "single" => {
            let email = form.email.as_deref().unwrap_or_default().trim();
            if !is_valid_email(email) {
                return Ok(render(Some("Invalid email format"), None));
            }
            let is_admin = form.is_admin.as_deref() == Some("on");
            match invite(&state.pool, state.mailer.as_ref(), &base, email, is_admin).await {
                Ok(_) => Ok(render(
                    None,
                    Some(&format!("User {email} created successfully. Setup email sent.")),
                )),
                Err(AuthError::Conflict(_)) => Ok(render(
                    Some(&format!("User with email {email} already exists")),
                    None,
                )),
                Err(e) => Err(e.into()),
            }
        }
        "bulk" => {
            let emails = form.emails.as_deref().unwrap_or_default();
            if emails.trim().is_empty() {
                return Ok(render(Some("Please enter at least one email address"), None));
            }
            let is_admin = form.bulk_admin.as_deref() == Some("on");
            let report =
                bulk_invite(&state.pool, state.mailer.as_ref(), &base, emails, is_admin).await;
            let summary = report.summary();
            if report.created.is_empty() {
                Ok(render(Some(&summary), None))
            } else {
                Ok(render(None, Some(&summary)))
            }
        }
        other => Err(AppError::Validation(format!("Unknown request type: {other}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    pub success: Option<String>,
}

/// `GET /admin/manage-users`
pub async fn manage_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ManageQuery>,
) -> AppResult<Html<String>> {
    let all = accounts::list_all(&state.pool).await?;
    Ok(Html(views::manage_users_page(
        state.site.nav(),
        user.as_ref(),
        &all,
        query.success.as_deref().filter(|s| !s.is_empty()),
    )))
}

#[derive(Debug, Deserialize)]
pub struct ResendForm {
    pub user_id: String,
}

/// `POST /admin/resend-setup-email`
pub async fn resend_setup_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ResendForm>,
) -> AppResult<Redirect> {
    let id: i64 = form
        .user_id
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID".into()))?;

    let account = accounts::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Validation("User not found".into()))?;

    let token = accounts::regenerate_setup_token(&state.pool, id).await?;
    let url = setup_url(&base_url(&state.config, &headers), &token);
    let sent = send_setup_email(state.mailer.as_ref(), &account.email, &url).await;
    info!(email = %account.email, sent, "setup token regenerated");

    Ok(Redirect::to(if sent { RESENT } else { RESEND_FAILED }))
}
