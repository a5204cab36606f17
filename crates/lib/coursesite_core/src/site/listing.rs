//! Collection listings.

use std::path::Path;

use tracing::warn;

use super::INDEX_FILE;
use super::display::display_name;

/// One file shown in a collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Raw file name.
    pub name: String,
    /// Site URL, e.g. `/lectures/week1.md`.
    pub url: String,
    pub display_name: String,
}

/// Immediate non-directory children of `<root>/<collection>`, excluding the
/// collection's own index document, sorted by raw file name.
///
/// An unreadable directory yields an empty listing.
pub fn list_collection(root: &Path, collection: &str) -> Vec<ListingEntry> {
    let dir = root.join(collection);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(collection, error = %e, "could not list collection directory");
            return Vec::new();
        }
    };

    let mut listing: Vec<ListingEntry> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name != INDEX_FILE)
        .map(|name| ListingEntry {
            url: format!("/{collection}/{name}"),
            display_name: display_name(&name),
            name,
        })
        .collect();

    listing.sort_by(|a, b| a.name.cmp(&b.name));
    listing
}
