//! Invitation workflows: single and bulk account creation, setup emails.

use axum::http::HeaderMap;
use axum::http::header::HOST;
use coursesite_core::auth::{AuthError, accounts};
use coursesite_core::mail::{Mailer, setup_email};
use coursesite_core::models::account::Account;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::config::WebConfig;

/// Minimal shape check: something with an `@` and a `.`.
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

/// Base URL for links in outgoing mail, without a trailing slash.
pub fn base_url(config: &WebConfig, headers: &HeaderMap) -> String {
    if let Some(url) = config.public_url.as_deref()
        && !url.is_empty()
    {
        return url.trim_end_matches('/').to_string();
    }
    match headers.get(HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{host}"),
        None => format!("http://{}", config.bind_addr()),
    }
}

pub fn setup_url(base_url: &str, token: &str) -> String {
    format!("{base_url}/setup?token={token}")
}

/// Email a setup link. Returns whether the message was handed off; failures
/// are logged and never propagated.
pub async fn send_setup_email(mailer: &dyn Mailer, email: &str, url: &str) -> bool {
    if !mailer.is_configured() {
        info!(to = email, setup_url = url, "setup link (mail not configured)");
    }
    let (subject, body) = setup_email(url);
    match mailer.send(email, &subject, &body).await {
        Ok(()) => true,
        Err(e) => {
            warn!(to = email, error = %e, "failed to send setup email");
            false
        }
    }
}

/// Create one account and send its setup email.
pub async fn invite(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    base_url: &str,
    email: &str,
    is_admin: bool,
) -> Result<Account, AuthError> {
    let account = accounts::create_account(pool, email, is_admin).await?;
    info!(email, is_admin, "account created");
    if let Some(token) = account.setup_token.as_deref() {
        send_setup_email(mailer, email, &setup_url(base_url, token)).await;
    }
    Ok(account)
}

/// Per-email results of a bulk invitation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub created: Vec<String>,
    /// `"email (reason)"` entries.
    pub skipped: Vec<String>,
    /// `"email (reason)"` entries.
    pub errored: Vec<String>,
}

impl BulkReport {
    /// One-line summary listing each non-empty group.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.created.is_empty() {
            parts.push(format!(
                "Successfully created {} users: {}.",
                self.created.len(),
                self.created.join(", ")
            ));
        }
        if !self.skipped.is_empty() {
            parts.push(format!(
                "Skipped {} users: {}.",
                self.skipped.len(),
                self.skipped.join(", ")
            ));
        }
        if !self.errored.is_empty() {
            parts.push(format!(
                "Errors with {} users: {}.",
                self.errored.len(),
                self.errored.join(", ")
            ));
        }
        parts.join(" ")
    }
}

/// Invite every address in a newline-separated list. Each line is handled
/// independently; blank lines are ignored.
pub async fn bulk_invite(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    base_url: &str,
    emails: &str,
    is_admin: bool,
) -> BulkReport {
    let mut report = BulkReport::default();
    for email in emails.lines().map(str::trim).filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            report.skipped.push(format!("{email} (invalid format)"));
            continue;
        }
        match invite(pool, mailer, base_url, email, is_admin).await {
            Ok(_) => report.created.push(email.to_string()),
            Err(AuthError::Conflict(_)) => report.skipped.push(format!("{email} (already exists)")),
            Err(AuthError::Db(e)) => {
                error!(email, error = %e, "bulk invite: database error");
                report.errored.push(format!("{email} (database error)"));
            }
            Err(e) => {
                error!(email, error = %e, "bulk invite: creation failed");
                report.errored.push(format!("{email} (creation failed)"));
            }
        }
    }
    info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        errored = report.errored.len(),
        "bulk invite finished"
    );
    report
}
