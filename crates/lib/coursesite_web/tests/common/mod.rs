//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use coursesite_core::auth::{accounts, password::hash_password, session::SessionKeys};
use coursesite_core::db::connect_in_memory;
use coursesite_core::mail::{MailError, Mailer};
use coursesite_core::models::account::Account;
use coursesite_core::site::SiteLayout;
use coursesite_web::AppState;
use coursesite_web::config::WebConfig;
use tempfile::TempDir;
use tower::ServiceExt;

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.into(), subject.into(), html_body.into()));
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub site: TempDir,
    pub uploads: TempDir,
}

fn write_site(root: &std::path::Path) {
    fs::write(root.join("index.md"), "# Welcome\n\nCourse home page.\n").unwrap();
    fs::write(root.join("outline.md"), "# Outline\n").unwrap();
    fs::write(root.join("page.html"), "<p id=\"fragment\">Pre-rendered</p>").unwrap();
    fs::write(root.join("notes.txt"), "plain notes").unwrap();
    fs::create_dir_all(root.join("lectures")).unwrap();
    fs::write(root.join("lectures/index.md"), "Lecture notes for the term.\n").unwrap();
    fs::write(root.join("lectures/week1.md"), "# Week 1\n").unwrap();
    fs::write(root.join("lectures/exam-review.md"), "# Review\n").unwrap();
    fs::create_dir_all(root.join("code")).unwrap();
    fs::write(root.join("code/main.go"), "package main\n").unwrap();
    fs::create_dir_all(root.join("_private")).unwrap();
    fs::write(root.join("_private/answers.md"), "# Answers\n").unwrap();
    fs::write(
        root.join("site-config.toml"),
        "nav_files = [\"outline.md\", \"lectures\"]\ncollections = [\"lectures\"]\n",
    )
    .unwrap();
}

/// Full application over a temporary site and an in-memory database.
pub async fn test_app(customize: impl FnOnce(&mut WebConfig)) -> TestApp {
    let site = tempfile::tempdir().unwrap();
    let uploads = tempfile::tempdir().unwrap();
    write_site(site.path());

    let mut config = WebConfig {
        site_dir: site.path().to_path_buf(),
        uploads_dir: uploads.path().join("incoming"),
        ..WebConfig::default()
    };
    customize(&mut config);

    let pool = connect_in_memory().await.unwrap();
    let layout = SiteLayout::load(site.path()).unwrap();
    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState {
        pool,
        config: Arc::new(config),
        site: Arc::new(layout),
        sessions: SessionKeys::from_secret(b"integration-test-secret"),
        mailer: mailer.clone(),
    };

    TestApp {
        state,
        mailer,
        site,
        uploads,
    }
}

impl TestApp {
    pub fn router(&self) -> Router {
        coursesite_web::router(self.state.clone())
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router().oneshot(req).await.unwrap()
    }

    /// An account that has completed setup with `password`.
    pub async fn account(&self, email: &str, password: &str, is_admin: bool) -> Account {
        let account = accounts::create_account(&self.state.pool, email, is_admin)
            .await
            .unwrap();
        let token = account.setup_token.clone().unwrap();
        let hash = hash_password(password).unwrap();
        accounts::complete_setup(&self.state.pool, &token, &hash)
            .await
            .unwrap();
        accounts::find_by_id(&self.state.pool, account.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// `Cookie` header value carrying a fresh session for `account`.
    pub fn session_cookie(&self, account: &Account) -> String {
        format!("auth_token={}", self.state.sessions.issue(account).unwrap())
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, "course.test")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
