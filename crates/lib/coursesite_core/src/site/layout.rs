//! Site configuration (`site-config.toml`) and the validated, immutable
//! [`SiteLayout`] built from it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::display::display_name;
use super::{SITE_CONFIG_FILE, SiteError};

/// Contents of `<site_dir>/site-config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Top-level files or collections shown in the navigation bar, in order.
    pub nav_files: Vec<String>,
    /// Top-level directories whose contents are auto-indexed.
    pub collections: Vec<String>,
}

impl SiteConfig {
    /// Read and parse `site-config.toml` from `site_dir`.
    pub fn load(site_dir: &Path) -> Result<Self, SiteError> {
        let path = site_dir.join(SITE_CONFIG_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| SiteError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| SiteError::Config { path, source })
    }
}

/// One navigation bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub name: String,
    pub url: String,
}

/// Read-only description of the served site.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    root: PathBuf,
    collections: Vec<String>,
    nav: Vec<NavItem>,
}

impl SiteLayout {
    /// Validate `config` against the files under `root` and build the layout.
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig) -> Result<Self, SiteError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SiteError::MissingSiteDir(root));
        }

        for name in &config.collections {
            if !is_top_level(name) {
                return Err(SiteError::CollectionNotTopLevel(name.clone()));
            }
            if !root.join(name).is_dir() {
                return Err(SiteError::MissingCollection(name.clone()));
            }
        }

        for file in &config.nav_files {
            if !is_top_level(file) {
                return Err(SiteError::NavNotTopLevel(file.clone()));
            }
            if config.collections.contains(file) {
                continue;
            }
            let path = root.join(file);
            if path.is_dir() {
                return Err(SiteError::NavIsDirectory(file.clone()));
            }
            if !path.exists() {
                return Err(SiteError::MissingNavTarget(file.clone()));
            }
        }

        let nav = nav_items(&config.nav_files);
        info!(
            root = %root.display(),
            collections = config.collections.len(),
            nav = nav.len(),
            "site layout loaded"
        );

        Ok(Self {
            root,
            collections: config.collections,
            nav,
        })
    }

    /// Load `site-config.toml` from `root` and validate it.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, SiteError> {
        let root = root.into();
        let config = SiteConfig::load(&root)?;
        Self::new(root, config)
    }

    /// Document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `name` is a declared collection.
    pub fn is_collection(&self, name: &str) -> bool {
        self.collections.iter().any(|c| c == name)
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// Navigation entries, "Home" first.
    pub fn nav(&self) -> &[NavItem] {
        &self.nav
    }
}

fn is_top_level(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path.file_name().is_some_and(|f| f == path.as_os_str())
        && name != "."
        && name != ".."
}

fn nav_items(files: &[String]) -> Vec<NavItem> {
    let mut items = vec![NavItem {
        name: "Home".to_string(),
        url: "/".to_string(),
    }];
    items.extend(files.iter().map(|file| NavItem {
        name: display_name(file),
        url: format!("/{file}"),
    }));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.md"), "# Home").unwrap();
        fs::write(dir.path().join("outline.md"), "# Outline").unwrap();
        fs::create_dir(dir.path().join("lectures")).unwrap();
        dir
    }

    fn config(nav: &[&str], collections: &[&str]) -> SiteConfig {
        SiteConfig {
            nav_files: nav.iter().map(|s| s.to_string()).collect(),
            collections: collections.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn valid_layout_builds_nav() {
        let dir = site();
        let site_config = config(&["outline.md", "lectures"], &["lectures"]);
        let layout = SiteLayout::new(dir.path(), site_config).unwrap();

        let names: Vec<&str> = layout.nav().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(vec!["Home", "Outline", "Lectures"], names);
        assert_eq!("/lectures", layout.nav()[2].url);
        assert!(layout.is_collection("lectures"));
        assert!(!layout.is_collection("outline.md"));
    }

    #[test]
    fn missing_site_dir() {
        let dir = site();
        let err = SiteLayout::new(dir.path().join("nope"), SiteConfig::default()).unwrap_err();
        assert!(matches!(err, SiteError::MissingSiteDir(_)));
    }

    #[test]
    fn collection_must_exist_and_be_top_level() {
        let dir = site();
        assert!(matches!(
            SiteLayout::new(dir.path(), config(&[], &["quizzes"])).unwrap_err(),
            SiteError::MissingCollection(_)
        ));
        assert!(matches!(
            SiteLayout::new(dir.path(), config(&[], &["lectures/old"])).unwrap_err(),
            SiteError::CollectionNotTopLevel(_)
        ));
    }

    #[test]
    fn nav_target_rules() {
        let dir = site();
        assert!(matches!(
            SiteLayout::new(dir.path(), config(&["missing.md"], &[])).unwrap_err(),
            SiteError::MissingNavTarget(_)
        ));
        assert!(matches!(
            SiteLayout::new(dir.path(), config(&["lectures"], &[])).unwrap_err(),
            SiteError::NavIsDirectory(_)
        ));
        assert!(matches!(
            SiteLayout::new(dir.path(), config(&["lectures/a.md"], &[])).unwrap_err(),
            SiteError::NavNotTopLevel(_)
        ));
    }

    #[test]
    fn load_reads_site_config() {
        let dir = site();
        fs::write(
            dir.path().join(SITE_CONFIG_FILE),
            "nav_files = [\"outline.md\"]\ncollections = [\"lectures\"]\n",
        )
        .unwrap();
        let layout = SiteLayout::load(dir.path()).unwrap();
        assert_eq!(&["lectures".to_string()], layout.collections());
        assert_eq!(2, layout.nav().len());
    }

    #[test]
    fn load_reports_bad_toml() {
        let dir = site();
        fs::write(dir.path().join(SITE_CONFIG_FILE), "nav_files = 3").unwrap();
        assert!(matches!(
            SiteLayout::load(dir.path()).unwrap_err(),
            SiteError::Config { .. }
        ));
    }
}
