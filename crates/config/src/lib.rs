//! Configuration loading, validation, and management for ContextForge.
//!
//! Loads configuration from `~/.contextforge/config.toml` with environment
//! variable overrides. Validates all settings at load time.

use contextforge_core::{DEFAULT_TOTAL_BUDGET, SourceKind, Zone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.contextforge/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Per-zone and total token budgets
    #[serde(default)]
    pub budgets: BudgetConfig,

    /// Skill package import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Skill package export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Token budgets, applied per session unless the session overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_permanent_budget")]
    pub permanent: u64,

    #[serde(default = "default_stable_budget")]
    pub stable: u64,

    #[serde(default = "default_working_budget")]
    pub working: u64,

    #[serde(default = "default_total_budget")]
    pub total: u64,
}

fn default_permanent_budget() -> u64 {
    Zone::Permanent.default_budget()
}
fn default_stable_budget() -> u64 {
    Zone::Stable.default_budget()
}
fn default_working_budget() -> u64 {
    Zone::Working.default_budget()
}
fn default_total_budget() -> u64 {
    DEFAULT_TOTAL_BUDGET
}

impl BudgetConfig {
    /// The budget configured for one zone.
    pub fn for_zone(&self, zone: Zone) -> u64 {
        match zone {
            Zone::Permanent => self.permanent,
            Zone::Stable => self.stable,
            Zone::Working => self.working,
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            permanent: default_permanent_budget(),
            stable: default_stable_budget(),
            working: default_working_budget(),
            total: default_total_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Zone the primary document lands in
    #[serde(default = "default_skill_zone")]
    pub default_skill_zone: Zone,

    /// Source kind recorded on imported blocks when the caller gives none
    #[serde(default)]
    pub source: SourceKind,
}

fn default_skill_zone() -> Zone {
    Zone::Stable
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_skill_zone: default_skill_zone(),
            source: SourceKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Longest generated file stem
    #[serde(default = "default_max_filename_len")]
    pub max_filename_len: usize,

    /// Longest title taken from a block's first line
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Numbered suffixes tried before falling back to a timestamp
    #[serde(default = "default_collision_attempts")]
    pub collision_attempts: u32,
}

fn default_max_filename_len() -> usize {
    50
}
fn default_title_max_chars() -> usize {
    60
}
fn default_collision_attempts() -> u32 {
    1000
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_filename_len: default_max_filename_len(),
            title_max_chars: default_title_max_chars(),
            collision_attempts: default_collision_attempts(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.contextforge/config.toml).
    ///
    /// Environment overrides:
    /// - `CONTEXTFORGE_CONFIG` - alternate config file path
    /// - `CONTEXTFORGE_TOTAL_BUDGET` - total token budget
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("CONTEXTFORGE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&config_path)?;

        if let Ok(total) = std::env::var("CONTEXTFORGE_TOTAL_BUDGET") {
            config.budgets.total = total.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "CONTEXTFORGE_TOTAL_BUDGET must be a positive integer, got '{total}'"
                ))
            })?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".contextforge")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for zone in Zone::ALL {
            let budget = self.budgets.for_zone(zone);
            if budget == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "budgets.{} must be > 0",
                    zone.dir_name()
                )));
            }
            if budget > self.budgets.total {
                return Err(ConfigError::ValidationError(format!(
                    "budgets.{} ({budget}) exceeds budgets.total ({})",
                    zone.dir_name(),
                    self.budgets.total
                )));
            }
        }

        if self.export.max_filename_len == 0 {
            return Err(ConfigError::ValidationError(
                "export.max_filename_len must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for contextforge_core::Error {
    fn from(err: ConfigError) -> Self {
        contextforge_core::Error::Config {
            message: err.to_string(),
        }
    }
}
