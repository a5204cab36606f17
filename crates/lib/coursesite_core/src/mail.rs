//! Outbound transactional email.
//!
//! [`ResendMailer`] posts to the Resend HTTP API; [`LogMailer`] only logs and
//! is used when no API key is configured.

use std::time::Duration;

use async_trait::async_trait;
use maud::{DOCTYPE, PreEscaped, html};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::auth::setup_token::SETUP_TOKEN_VALIDITY_DAYS;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Sender used when none is configured (Resend's shared test domain).
pub const DEFAULT_FROM_EMAIL: &str = "onboarding@resend.dev";

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Sends an HTML email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;

    /// Whether messages actually leave the process.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        info!(
            to,
            subject,
            body_len = html_body.len(),
            "mail not configured; logging instead of sending"
        );
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

/// Delivers mail through the Resend API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: Option<String>) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            from: from
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            endpoint: RESEND_ENDPOINT.to_string(),
        })
    }

    /// Point the mailer at a different API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ResendRequest {
                from: &self.from,
                to: [to],
                subject,
                html: html_body,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let sent: ResendResponse = resp.json().await?;
        info!(to, id = %sent.id, "email sent via Resend");
        Ok(())
    }
}

const EMAIL_STYLE: &str = "
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; background: #f4f4f4; }
.container { max-width: 600px; margin: 20px auto; background: white; padding: 20px; }
.button { display: inline-block; background: #2563eb; color: white; padding: 12px 24px; }
.url-box { background: #f8f9fa; padding: 10px; font-family: monospace; word-break: break-all; }
.footer { margin-top: 20px; border-top: 1px solid #eee; font-size: 12px; color: #666; }
";

/// Subject and HTML body of the account-setup email.
pub fn setup_email(setup_url: &str) -> (String, String) {
    let subject = "Course Website Account Setup".to_string();
    let body = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (subject) }
                style { (PreEscaped(EMAIL_STYLE)) }
            }
            body {
                div.container {
                    h2 { "Welcome" }
                    p {
                        "An account has been created for you on the course website. "
                        "To get started, set up your password."
                    }
                    p style="text-align: center;" {
                        a.button href=(setup_url) { "Set Up Your Account" }
                    }
                    p {
                        strong { "Important:" }
                        " this setup link expires in " (SETUP_TOKEN_VALIDITY_DAYS) " days. "
                        "If it expires, ask your instructor to send a new one."
                    }
                    p { "If the button doesn't work, copy this URL into your browser:" }
                    div.url-box { (setup_url) }
                    div.footer {
                        p {
                            "This email was sent automatically by the course website. "
                            "If you received it in error, please contact your instructor."
                        }
                    }
                }
            }
        }
    };
    (subject, body.into_string())
}
