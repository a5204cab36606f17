//! Human-readable names for site paths.

use std::path::Path;

use super::INDEX_FILE;

/// Display name for a site path such as `lectures/week-1.md`.
///
/// The extension is dropped; an index document takes its directory's name
/// (the root index is "Home"); hyphens become spaces; a leading letter is
/// upper-cased.
pub fn display_name(path: &str) -> String {
    let path = Path::new(path.trim_start_matches('/'));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    let raw = if file == INDEX_FILE {
        match path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|d| d.to_string_lossy().into_owned())
        {
            Some(dir) => dir,
            None => return "Home".to_string(),
        }
    } else {
        strip_extension(&file).to_string()
    };

    capitalize(&raw.replace('-', " "))
}

fn strip_extension(file: &str) -> &str {
    match file.rfind('.') {
        Some(0) | None => file,
        Some(i) => &file[..i],
    }
}

/// Upper-case the first character if it is alphabetic; identity otherwise.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().chain(chars).collect(),
        _ => word.to_string(),
    }
}
