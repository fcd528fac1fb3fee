#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for jtrans
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/jtrans/config.toml)
//! - Environment variables
//! - CLI flags
//!
//! It also reads the rule files themselves into [`RuleMaps`].

pub mod properties;
pub mod rules;

pub use rules::{RuleFiles, RuleMaps};

use jtrans_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rule file locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RulesConfig {
    pub selections: Option<PathBuf>,
    pub renames: Option<PathBuf>,
    pub versions: Option<PathBuf>,
    pub bundles: Option<PathBuf>,
    pub direct: Option<PathBuf>,
    #[serde(default)]
    pub invert: bool,
}

/// Output handling
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub overwrite: bool,
}

/// Logging defaults, overridden by `RUST_LOG`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("jtrans").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let Ok(config_path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean environment variable has a value other
    /// than `true`, `false`, `1` or `0`.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        for (var, slot) in [
            ("JTRANS_SELECTIONS", &mut self.rules.selections),
            ("JTRANS_RENAMES", &mut self.rules.renames),
            ("JTRANS_VERSIONS", &mut self.rules.versions),
            ("JTRANS_BUNDLES", &mut self.rules.bundles),
            ("JTRANS_DIRECT", &mut self.rules.direct),
        ] {
            if let Ok(path) = std::env::var(var) {
                *slot = Some(PathBuf::from(path));
            }
        }

        if let Some(invert) = env_flag("JTRANS_INVERT")? {
            self.rules.invert = invert;
        }
        if let Some(overwrite) = env_flag("JTRANS_OVERWRITE")? {
            self.output.overwrite = overwrite;
        }
        if let Ok(level) = std::env::var("JTRANS_LOG") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Rule file locations as configured
    #[must_use]
    pub fn rule_files(&self) -> RuleFiles {
        RuleFiles {
            selections: self.rules.selections.clone(),
            renames: self.rules.renames.clone(),
            versions: self.rules.versions.clone(),
            bundles: self.rules.bundles.clone(),
            direct: self.rules.direct.clone(),
        }
    }
}

fn env_flag(var: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => match value.as_str() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                field: var.to_string(),
                value,
            }),
        },
        Err(_) => Ok(None),
    }
}
