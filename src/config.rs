//! Configuration loader for the shell

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "COALEN_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Directory holding created but not yet installed packages
    pub packages_dir: PathBuf,
    /// Directory holding installed packages
    pub installed_dir: PathBuf,
    /// JSON user registry
    pub users_file: PathBuf,
    /// File inside an installed package that `packager -run` executes
    pub entry_artifact: String,
    /// Program used to run the entry artifact
    pub interpreter: String,
    pub prompt_name: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("Packages"),
            installed_dir: PathBuf::from("InstalledPackages"),
            users_file: PathBuf::from("users.json"),
            entry_artifact: "main.py".to_string(),
            interpreter: "python".to_string(),
            prompt_name: crate::SHELL_NAME.to_string(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ShellConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: explicit path, then `COALEN_CONFIG`, then the
    /// user config directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                log::debug!("Using config file {}", path.display());
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.packages_dir == self.installed_dir {
            return Err(ConfigError::Invalid(
                "packages_dir and installed_dir must differ".to_string(),
            ));
        }

        // The entry artifact is joined onto a package directory
        if self.entry_artifact.is_empty()
            || self.entry_artifact.contains('/')
            || self.entry_artifact.contains('\\')
        {
            return Err(ConfigError::Invalid(format!(
                "entry_artifact must be a plain file name, got '{}'",
                self.entry_artifact
            )));
        }

        if self.interpreter.trim().is_empty() {
            return Err(ConfigError::Invalid("interpreter cannot be empty".to_string()));
        }

        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coalen").join("config.toml"))
}
