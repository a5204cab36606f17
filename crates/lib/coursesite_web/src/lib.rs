//! # coursesite_web
//!
//! HTTP layer for Coursesite: routing, access guard, pages and uploads.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use coursesite_core::auth::session::SessionKeys;
use coursesite_core::mail::Mailer;
use coursesite_core::site::SiteLayout;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::WebConfig;
use crate::handlers::{admin, auth, content, upload};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool.
    pub pool: SqlitePool,
    pub config: Arc<WebConfig>,
    /// Validated site layout, fixed for the process lifetime.
    pub site: Arc<SiteLayout>,
    /// Session signing keys.
    pub sessions: SessionKeys,
    pub mailer: Arc<dyn Mailer>,
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .route("/setup", get(auth::setup_form).post(auth::setup_submit));

    // Admin routes
    let admin = Router::new()
        .route(
            "/admin/add-users",
            get(admin::add_users_form).post(admin::add_users_submit),
        )
        .route("/admin/manage-users", get(admin::manage_users))
        .route("/admin/resend-setup-email", post(admin::resend_setup_email))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ));

    // Signed-in routes
    let mut protected = Router::new()
        .route(
            "/change-password",
            get(auth::change_password_form).post(auth::change_password_submit),
        )
        .route("/", get(content::root))
        .route("/{*path}", get(content::page));

    if state.config.uploads_allowed {
        protected = protected.route(
            "/upload/{secret}/{filename}",
            put(upload::upload).layer(DefaultBodyLimit::max(state.config.upload_max_bytes)),
        );
    }

    let protected = protected.layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::require_auth,
    ));

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
