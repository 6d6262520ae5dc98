//! Configuration management for the metadata core.
//!
//! Configuration is read from a TOML file and then overridden by environment
//! variables (a `.env` file in the working directory is honoured).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema registry locations.
    pub schema: SchemaConfig,
    /// XML export settings.
    pub export: ExportConfig,
    /// Cluster lock settings.
    pub lock: LockConfig,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Schema registry locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Directory containing `*.schema.json` and `*.addendum.json` files.
    pub schema_dir: PathBuf,
    /// Directory containing `*.template.json` default documents.
    pub template_dir: PathBuf,
}

/// Longest freshness window, in days, accepted for exported metadata.
pub const MAX_VALIDITY_DAYS: i64 = 3650;

/// XML export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Days added to the export clock to stamp `validUntil`.
    pub validity_days: i64,
    /// Publisher recorded in the registration info of exported feeds.
    pub publisher: Option<String>,
}

/// Cluster lock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Identity of this node as a lock owner.
    pub node_id: String,
    /// Lease length for periodic jobs, in seconds.
    pub default_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: SchemaConfig::default(),
            export: ExportConfig::default(),
            lock: LockConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("config/schemas"),
            template_dir: PathBuf::from("config/templates"),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            validity_days: 14,
            publisher: None,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            node_id: uuid::Uuid::new_v4().to_string(),
            default_ttl_secs: 300,
        }
    }
}

impl LockConfig {
    /// Returns the default lease as a [`Duration`].
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

impl ExportConfig {
    /// Returns the freshness window as a chrono duration, clamped to
    /// `0..=MAX_VALIDITY_DAYS`.
    #[must_use]
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::days(self.validity_days.clamp(0, MAX_VALIDITY_DAYS))
    }

    fn validate(&self) -> ConfigResult<()> {
        if (0..=MAX_VALIDITY_DAYS).contains(&self.validity_days) {
            Ok(())
        } else {
            Err(ConfigError::out_of_range("export.validity_days", self.validity_days))
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// an error.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.export.validate()?;
        Ok(config)
    }

    /// Loads the file, then applies environment overrides.
    pub fn load_with_env(path: &Path) -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::load(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MD_SCHEMA_DIR") {
            self.schema.schema_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MD_TEMPLATE_DIR") {
            self.schema.template_dir = PathBuf::from(dir);
        }
        if let Some(days) = lookup("MD_EXPORT_VALIDITY_DAYS") {
            self.export.validity_days = days
                .parse::<i64>()
                .ok()
                .filter(|d| (0..=MAX_VALIDITY_DAYS).contains(d))
                .ok_or_else(|| ConfigError::invalid_env("MD_EXPORT_VALIDITY_DAYS", days))?;
        }
        if let Some(node) = lookup("MD_NODE_ID") {
            self.lock.node_id = node;
        }
        if let Some(ttl) = lookup("MD_LOCK_TTL_SECS") {
            self.lock.default_ttl_secs = ttl
                .parse()
                .map_err(|_| ConfigError::invalid_env("MD_LOCK_TTL_SECS", ttl))?;
        }
        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = level;
        }
        Ok(())
    }
}
