//! Configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory holding named lists (`<name>.fvp`)
    pub lists_dir: PathBuf,

    /// List used when neither `--list` nor `--file` is given
    pub default_list: String,

    /// Suffix appended to a list path to form its archive log
    pub archive_suffix: String,

    /// Start the TUI with done tasks hidden
    pub hide_done: bool,

    /// Start the TUI in the guided scan/focus flow
    pub strict: bool,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: Option<String>,
}

fn default_lists_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".fvp")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lists_dir: default_lists_dir(),
            default_list: crate::DEFAULT_LIST.to_string(),
            archive_suffix: crate::DEFAULT_ARCHIVE_SUFFIX.to_string(),
            hide_done: false,
            strict: true,
            log_level: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .fvp.yml
        let local_config = PathBuf::from(".fvp.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/fvp/fvp.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("fvp").join("fvp.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::debug!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Path of the list file to use: explicit file, then named list, then default list
    pub fn resolve_list_path(&self, file: Option<&Path>, list: Option<&str>) -> PathBuf {
        match (file, list) {
            (Some(file), _) => file.to_path_buf(),
            (None, Some(name)) => dotstore::list_path(&self.lists_dir, name),
            (None, None) => dotstore::list_path(&self.lists_dir, &self.default_list),
        }
    }
}
