//! Configuration management
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. `config.yaml` in the user config directory
//! 2. `.tolstack.yaml` in the working directory
//! 3. `TOLSTACK_*` environment variables

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".tolstack.yaml";

/// Stack file used when `--file` is not given
pub const DEFAULT_STACK_FILE: &str = "stack.json";

/// Decimal places used when nothing is configured
pub const DEFAULT_PRECISION: usize = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Analyst name recorded in new stack files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyst: Option<String>,

    /// Decimal places for printed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,

    /// Start new stack files in advanced statistical mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_mode: Option<bool>,

    /// Stack file used when `--file` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                config.merge(Self::load_file(&path)?);
            }
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.exists() {
            config.merge(Self::load_file(local)?);
        }

        config.merge(Self::from_env());

        Ok(config)
    }

    /// Path of the user-level config file
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tolstack").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Read one config file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            analyst: var("TOLSTACK_ANALYST").filter(|s| !s.trim().is_empty()),
            precision: var("TOLSTACK_PRECISION").and_then(|s| s.trim().parse().ok()),
            advanced_mode: var("TOLSTACK_ADVANCED").and_then(|s| parse_flag(&s)),
            default_file: var("TOLSTACK_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Overlay the values set in `other`
    pub fn merge(&mut self, other: Config) {
        if other.analyst.is_some() {
            self.analyst = other.analyst;
        }
        if other.precision.is_some() {
            self.precision = other.precision;
        }
        if other.advanced_mode.is_some() {
            self.advanced_mode = other.advanced_mode;
        }
        if other.default_file.is_some() {
            self.default_file = other.default_file;
        }
    }

    /// Analyst name, falling back to the login name
    pub fn analyst(&self) -> String {
        self.analyst
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_default()
    }

    pub fn precision(&self) -> usize {
        self.precision.unwrap_or(DEFAULT_PRECISION)
    }

    pub fn stack_file(&self) -> PathBuf {
        self.default_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STACK_FILE))
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
