//! Request path → content decision.
//!
//! Check order is fixed: hidden segments, root, collections, directories,
//! then extension. Only the directory check touches the filesystem.

use std::path::PathBuf;

use super::layout::SiteLayout;
use super::{HIDDEN_PREFIX, INDEX_FILE};

/// What to do with a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// Markdown document, relative to the document root.
    RenderMarkdown(PathBuf),
    /// Pre-rendered HTML fragment, relative to the document root.
    RenderHtml(PathBuf),
    /// Any other file, relative to the document root.
    ServeStatic(PathBuf),
    /// Auto-indexed listing of a declared collection.
    ListCollection(String),
    NotFound(String),
    Forbidden(String),
}

/// Resolve a (percent-decoded) request path against the site layout.
pub fn resolve(request_path: &str, layout: &SiteLayout) -> PathResolution {
    let segments = normalize(request_path);

    if let Some(hidden) = segments.iter().find(|s| s.starts_with(HIDDEN_PREFIX)) {
        return PathResolution::Forbidden(format!(
            "segments starting with '{HIDDEN_PREFIX}' are not accessible: {hidden}"
        ));
    }

    if segments.is_empty() {
        return PathResolution::RenderMarkdown(PathBuf::from(INDEX_FILE));
    }

    if let [name] = segments.as_slice()
        && layout.is_collection(name)
    {
        return PathResolution::ListCollection(name.to_string());
    }

    let relative: PathBuf = segments.iter().collect();
    if layout.root().join(&relative).is_dir() {
        return PathResolution::NotFound(format!(
            "directory listing is not supported outside collections: /{}",
            segments.join("/")
        ));
    }

    match relative.extension().and_then(|e| e.to_str()) {
        Some("md") => PathResolution::RenderMarkdown(relative),
        Some("html") => PathResolution::RenderHtml(relative),
        _ => PathResolution::ServeStatic(relative),
    }
}

/// Split a URL path into clean segments: empty and `.` segments vanish and
/// `..` pops, never climbing above the root.
fn normalize(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}
