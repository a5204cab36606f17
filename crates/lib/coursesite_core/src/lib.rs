//! # coursesite_core
//!
//! Core domain logic for Coursesite: accounts, tokens, site layout and
//! request-path resolution.

pub mod auth;
pub mod db;
pub mod mail;
pub mod markdown;
pub mod migrate;
pub mod models;
pub mod site;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
