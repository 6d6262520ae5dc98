//! CLI configuration.

use std::path::{Path, PathBuf};

use md_core::Config;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// Nothing but errors.
    Quiet,
}

/// Gets the default configuration file path.
pub fn default_config_path() -> crate::CliResult<PathBuf> {
    let base = dirs_next::config_dir()
        .or_else(dirs_next::home_dir)
        .ok_or_else(|| crate::CliError::InvalidArgument("could not determine config directory".to_string()))?;
    Ok(base.join("mdctl").join("config.toml"))
}

/// Loads the core configuration for a CLI invocation.
///
/// Precedence, lowest first: defaults, the TOML file, environment variables,
/// command-line flags.
pub fn load(cli: &Cli) -> crate::CliResult<Config> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load_with_env(&path)?;
    apply_flags(&mut config, cli.schema_dir.as_deref(), cli.template_dir.as_deref());
    Ok(config)
}

fn apply_flags(config: &mut Config, schema_dir: Option<&Path>, template_dir: Option<&Path>) {
    if let Some(dir) = schema_dir {
        config.schema.schema_dir = dir.to_path_buf();
    }
    if let Some(dir) = template_dir {
        config.schema.template_dir = dir.to_path_buf();
    }
}
