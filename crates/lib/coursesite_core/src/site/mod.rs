//! Site layout, request-path resolution and collection listings.

pub mod display;
pub mod layout;
pub mod listing;
pub mod resolver;

use std::path::PathBuf;

use thiserror::Error;

pub use layout::{NavItem, SiteConfig, SiteLayout};
pub use resolver::{PathResolution, resolve};

/// File name of the per-directory index document.
pub const INDEX_FILE: &str = "index.md";

/// Name of the site configuration file inside the document root.
pub const SITE_CONFIG_FILE: &str = "site-config.toml";

/// Path segments starting with this character are never served.
pub const HIDDEN_PREFIX: char = '_';

/// Site configuration and validation errors.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("site directory does not exist: {0}")]
    MissingSiteDir(PathBuf),

    #[error("collection must be a top-level directory name: {0}")]
    CollectionNotTopLevel(String),

    #[error("collection directory doesn't exist: {0}")]
    MissingCollection(String),

    #[error("navigation target must be top-level: {0}")]
    NavNotTopLevel(String),

    #[error("navigation target cannot be a directory unless it is a collection: {0}")]
    NavIsDirectory(String),

    #[error("navigation target doesn't exist: {0}")]
    MissingNavTarget(String),

    #[error("bad site config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
