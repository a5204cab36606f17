//! Binary uploads into the uploads directory.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: String,
    pub filename: String,
    pub bytes_written: usize,
}

/// Reduce a client-supplied name to its final path component.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}

/// `PUT /upload/{secret}/{filename}`
pub async fn upload(
    State(state): State<AppState>,
    Path((secret, filename)): Path<(String, String)>,
    body: Bytes,
) -> AppResult<Json<UploadResponse>> {
    if state.config.upload_secret.as_deref() != Some(secret.as_str()) {
        return Err(AppError::NotFound("upload secret mismatch".into()));
    }

    let name = sanitize_filename(&filename)
        .ok_or_else(|| AppError::Validation("Invalid filename".into()))?;

    let dir = &state.config.uploads_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("create {}: {e}", dir.display())))?;
    let target = dir.join(name);
    tokio::fs::write(&target, &body)
        .await
        .map_err(|e| AppError::Internal(format!("write {}: {e}", target.display())))?;

    info!(filename = name, bytes = body.len(), "file uploaded");
    Ok(Json(UploadResponse {
        status: "success",
        message: "File uploaded successfully".into(),
        filename: name.to_string(),
        bytes_written: body.len(),
    }))
}
