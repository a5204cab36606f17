//! Site content: resolves the request path and renders the outcome.

use std::path::{Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::HeaderValue;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use coursesite_core::markdown;
use coursesite_core::models::account::SessionClaims;
use coursesite_core::site::display::display_name;
use coursesite_core::site::listing::list_collection;
use coursesite_core::site::{INDEX_FILE, PathResolution, resolve};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::views;

/// Extensions served as plain text whatever their registered type.
const PLAIN_TEXT_EXTENSIONS: &[&str] = &["hs", "go", "txt"];

/// `GET /`
pub async fn root(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    request: Request,
) -> AppResult<Response> {
    serve(&state, user.as_ref(), "/", request).await
}

/// `GET /{*path}`
pub async fn page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(path): Path<String>,
    request: Request,
) -> AppResult<Response> {
    serve(&state, user.as_ref(), &path, request).await
}

async fn serve(
    state: &AppState,
    user: Option<&SessionClaims>,
    path: &str,
    request: Request,
) -> AppResult<Response> {
    let root = state.site.root();
    let nav = state.site.nav();

    match resolve(path, &state.site) {
        PathResolution::RenderMarkdown(rel) => {
            let source = read(root, &rel).await?;
            let html = markdown::render(&source)
                .map_err(|e| AppError::Internal(format!("markdown rendering failed: {e}")))?;
            Ok(Html(views::content_page(&title(&rel), nav, user, &html)).into_response())
        }
        PathResolution::RenderHtml(rel) => {
            let source = read(root, &rel).await?;
            let fragment = String::from_utf8_lossy(&source);
            Ok(Html(views::content_page(&title(&rel), nav, user, &fragment)).into_response())
        }
        PathResolution::ServeStatic(rel) => serve_static(root.join(&rel), request).await,
        PathResolution::ListCollection(name) => {
            let intro = match tokio::fs::read(root.join(&name).join(INDEX_FILE)).await {
                Ok(source) => markdown::render(&source)
                    .map_err(|e| AppError::Internal(format!("markdown rendering failed: {e}")))?,
                Err(_) => String::new(),
            };
            let collection_root = root.to_path_buf();
            let listing_name = name.clone();
            let entries = tokio::task::spawn_blocking(move || {
                list_collection(&collection_root, &listing_name)
            })
            .await
            .map_err(|e| AppError::Internal(format!("listing task failed: {e}")))?;
            let page = views::listing_page(&display_name(&name), nav, user, &intro, &entries);
            Ok(Html(page).into_response())
        }
        PathResolution::NotFound(reason) => {
            debug!(path, %reason, "not found");
            Err(AppError::NotFound(reason))
        }
        PathResolution::Forbidden(reason) => {
            debug!(path, %reason, "forbidden");
            Err(AppError::Forbidden(reason))
        }
    }
}

fn title(rel: &FsPath) -> String {
    display_name(&rel.to_string_lossy())
}

async fn read(root: &FsPath, rel: &FsPath) -> AppResult<Vec<u8>> {
    tokio::fs::read(root.join(rel))
        .await
        .map_err(|e| AppError::NotFound(format!("{}: {e}", rel.display())))
}

async fn serve_static(path: PathBuf, request: Request) -> AppResult<Response> {
    let is_file = tokio::fs::metadata(&path)
        .await
        .is_ok_and(|m| m.is_file());
    if !is_file {
        return Err(AppError::NotFound(format!("no such file: {}", path.display())));
    }

    let plain_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PLAIN_TEXT_EXTENSIONS.contains(&ext));

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);
    if plain_text {
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }
    Ok(response)
}
