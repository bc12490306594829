//! Configuration handling for crochet-ledger
//!
//! Configuration is stored in `.crochet/config.toml` (project) and
//! `~/.config/crochet-ledger/config.toml` (global). Missing keys fall back
//! to defaults; a table given in the file replaces the default table.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PricingConfig, TimeConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Currency code printed before amounts
    pub currency: String,

    pub pricing: PricingConfig,

    pub time: TimeConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            pricing: PricingConfig::default(),
            time: TimeConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Rejects values the calculations cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pricing = &self.pricing;

        if pricing.round_to < 1 {
            return Err(ConfigError::Invalid(
                "pricing.round_to must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("hourly_rate", pricing.hourly_rate),
            ("profit_margin", pricing.profit_margin),
            ("min_margin", pricing.min_margin),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "pricing.{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !self.time.hours_per_week.is_finite() || self.time.hours_per_week <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time.hours_per_week must be greater than 0, got {}",
                self.time.hours_per_week
            )));
        }

        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "crochet", "crochet-ledger")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads and validates project configuration from a specific root
    pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(".crochet").join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("In {}", config_path.display()))?;

        tracing::debug!(path = %config_path.display(), "loaded project config");
        Ok(config)
    }

    /// Finds the project root by looking for a `.crochet/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` to the first directory holding `.crochet/`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".crochet").is_dir())
            .map(Path::to_path_buf)
    }
}
