/// Configuration management for wireup
///
/// wireup stores configuration in ~/.wireup/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Frontend checkout location used when neither the CLI flag nor the config
/// file sets one. Relative to the backend working directory.
pub const DEFAULT_FRONTEND_ROOT: &str = "../love-space-frontend";

/// wireup configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Frontend checkout settings
    #[serde(default)]
    pub frontend: FrontendConfig,

    /// Backup settings
    #[serde(default)]
    pub backup: BackupConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to the frontend checkout
    #[serde(default = "default_frontend_root")]
    pub root: Option<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            root: Some(DEFAULT_FRONTEND_ROOT.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Number of backups to keep before pruning the oldest
    #[serde(default = "default_max_backups")]
    pub max_backups: Option<usize>,

    /// Custom backup directory
    #[serde(default)]
    pub backup_dir: Option<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            max_backups: Some(50),
            backup_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log operations to ~/.wireup/wireup.log
    #[serde(default = "default_debug")]
    pub debug: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { debug: Some(false) }
    }
}

// Default functions for serde
fn default_frontend_root() -> Option<String> { Some(DEFAULT_FRONTEND_ROOT.to_string()) }
fn default_max_backups() -> Option<usize> { Some(50) }
fn default_debug() -> Option<bool> { Some(false) }

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let config_dir = home_dir.join(".wireup");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    Ok(config_dir.join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# wireup Configuration File
#
# This file controls default behavior for wireup. Values set here can be
# overridden by command-line flags.
#
# For more information, run: wireup config --help

[frontend]
# Path to the love-space frontend checkout (default: ../love-space-frontend)
# Relative paths are resolved from the directory wireup is run in.
root = "../love-space-frontend"

[backup]
# Number of backups to keep before pruning the oldest (default: 50)
max_backups = 50

# Custom backup directory (optional)
# Uncomment to use a custom backup location instead of ~/.wireup/backups/
#backup_dir = "/mnt/backups/wireup"

[logging]
# Log patch operations to ~/.wireup/wireup.log (default: false)
debug = false
"#
}

/// Save the default commented configuration file
pub fn save_default_config() -> Result<()> {
    let config_path = config_file_path()?;

    fs::write(&config_path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", config_path.display()))?;

    Ok(())
}

/// Load configuration from file, creating default if needed
///
/// If the config file doesn't exist, creates it with defaults and returns them.
/// If the config file is malformed, recreates it with defaults.
pub fn load_config() -> Result<Config> {
    let config_path = config_file_path()?;

    if !config_path.exists() {
        save_default_config()?;
    }

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: Config = match toml::from_str(&config_str) {
        Ok(config) => config,
        Err(_) => {
            // Config is malformed, recreate with defaults
            save_default_config()?;
            return Ok(Config::default());
        }
    };

    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(root) = &config.frontend.root {
        if root.trim().is_empty() {
            anyhow::bail!("Invalid frontend root: must not be empty");
        }
    }

    if let Some(max) = config.backup.max_backups {
        if max == 0 {
            anyhow::bail!("Invalid max_backups: 0 (at least one backup must be kept)");
        }
    }

    Ok(())
}

/// Resolve the frontend root: CLI flag wins, then config, then the default.
pub fn resolve_frontend_root(cli_root: Option<&str>, config: &Config) -> PathBuf {
    match cli_root {
        Some(root) => PathBuf::from(root),
        None => PathBuf::from(
            config
                .frontend
                .root
                .as_deref()
                .unwrap_or(DEFAULT_FRONTEND_ROOT),
        ),
    }
}
