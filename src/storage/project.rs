//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, JsonStore, PhotoInbox};
use crate::domain::EntityKind;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a crochet project. Run 'crochet init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# crochet-ledger configuration
# Every key is optional; a table given here replaces the built-in table.

currency = "EUR"

[pricing]
hourly_rate = 8.00
profit_margin = 0.20
# Reserved, not applied to prices
min_margin = 0.10
# Round suggested prices to the nearest multiple of this
round_to = 5

[pricing.stitch_complexity]
basic = 1.0
textured = 1.15
lace = 1.25
colorwork = 1.30
specialty = 1.40

[pricing.size_factors]
hat = 0.8
cowl = 0.9
scarf = 1.0
shawl = 1.2
blanket = 1.5
other = 1.0

[time]
hours_per_week = 5.0
# Default for piece types missing from [time.default_hours]
fallback_hours = 15.0

[time.default_hours]
hat = 6.0
cowl = 8.0
scarf = 12.0
shawl = 20.0
blanket = 40.0
other = 15.0
"#;

/// A crochet project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".crochet").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a project at the given path; existing files are kept
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(".crochet");

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create .crochet directory: {}", data_dir.display())
        })?;

        for kind in EntityKind::ALL {
            let inbox = PhotoInbox::inbox_dir(&root, kind);
            fs::create_dir_all(&inbox)
                .with_context(|| format!("Failed to create inbox: {}", inbox.display()))?;
        }

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let store = JsonStore::for_project(&root);
        if !store.pieces().path().exists() {
            store.pieces().write_all(&[])?;
        }
        if !store.yarns().path().exists() {
            store.yarns().write_all(&[])?;
        }
        if !store.stitches().path().exists() {
            store.stitches().write_all(&[])?;
        }

        tracing::info!(root = %root.display(), "initialized project");
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .crochet directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(".crochet")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the record store
    pub fn store(&self) -> JsonStore {
        JsonStore::for_project(&self.root)
    }

    /// Returns the photo inbox for one kind of record
    pub fn inbox(&self, kind: EntityKind) -> PhotoInbox {
        PhotoInbox::new(&self.root, kind)
    }
}
