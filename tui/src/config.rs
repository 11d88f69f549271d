//! Layered configuration for the `tsa` client using figment.
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. User-global `<config_dir>/tsa/config.toml`
//! 3. Project-local `tsa.toml`, or the file given with `--config`
//! 4. Environment variables (`TSA_*` prefix, `__` separates sections, so
//!    `TSA_API__BASE_URL` maps to `api.base_url`)
//!
//! The `--base-url` flag is applied on top by the binary.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the task service listens by default.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const LOCAL_CONFIG_FILE: &str = "tsa.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Configuration file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TsaConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Task service root, without the `/tasks` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Log sink. The terminal is in raw mode while the UI runs, so logs go to a file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_file() -> String {
    "tsa.log".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl TsaConfig {
    /// Load from every source. `explicit` replaces the project-local file and
    /// must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
        }
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        match explicit {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
                if local_path.exists() {
                    figment = figment.merge(Toml::file(local_path));
                }
            }
        }

        figment.merge(Env::prefixed("TSA_").split("__"))
    }

    /// Apply a command-line base URL over whatever the layers produced.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Result<Self, ConfigError> {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
            self.validate()?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: format!("expected an http:// or https:// URL, got '{url}'"),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tsa").join("config.toml"))
    }
}
