//! Server configuration.
//!
//! Read from a TOML file, then overridden from the environment:
//!
//! | Variable         | Field               |
//! |------------------|---------------------|
//! | `PORT`           | `port`              |
//! | `RESEND_API_KEY` | `resend_api_key`    |
//! | `FROM_EMAIL`     | `resend_from_email` |
//! | `SESSION_SECRET` | `session_secret`    |

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Whether the access guard runs at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Normal operation: sessions and admin checks are enforced.
    #[default]
    Enforced,
    /// Local development only: every request is let through unauthenticated.
    Disabled,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the web server.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Document root served by the site.
    pub site_dir: PathBuf,
    pub port: u16,
    pub bind_host: String,
    /// SQLite database file.
    pub db_path: String,
    pub uploads_allowed: bool,
    /// Path segment that must appear in upload URLs.
    pub upload_secret: Option<String>,
    pub uploads_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub resend_api_key: Option<String>,
    pub resend_from_email: Option<String>,
    /// Base URL used in setup links; falls back to the request's `Host`.
    pub public_url: Option<String>,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    pub session_secret: Option<String>,
    pub auth: AuthMode,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("site"),
            port: 8080,
            bind_host: "127.0.0.1".into(),
            db_path: "coursesite.db".into(),
            uploads_allowed: false,
            upload_secret: None,
            uploads_dir: PathBuf::from("uploads"),
            upload_max_bytes: 64 * 1024 * 1024,
            resend_api_key: None,
            resend_from_email: None,
            public_url: None,
            secure_cookies: false,
            session_secret: None,
            auth: AuthMode::Enforced,
        }
    }
}

impl WebConfig {
    /// Load the TOML file at `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = var("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(key) = var("RESEND_API_KEY") {
            self.resend_api_key = Some(key);
        }
        if let Some(from) = var("FROM_EMAIL") {
            self.resend_from_email = Some(from);
        }
        if let Some(secret) = var("SESSION_SECRET") {
            self.session_secret = Some(secret);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uploads_allowed && self.upload_secret.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Invalid(
                "uploads_allowed requires a non-empty upload_secret".into(),
            ));
        }
        if self.upload_max_bytes == 0 {
            return Err(ConfigError::Invalid("upload_max_bytes must be positive".into()));
        }
        Ok(())
    }

    /// Listener address, e.g. `127.0.0.1:8080`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}
