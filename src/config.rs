//! # Configuration
//!
//! Settings for the studio binary. Values come from three tiers, later ones
//! winning:
//!
//! 1. Built-in defaults.
//! 2. A TOML file named by `STUDIO_CONFIG` (skipped when unset or missing).
//! 3. `STUDIO_API_BASE_URL` and `STUDIO_COURSE_ID`.
//!
//! ```toml
//! api_base_url = "https://studio.example.com/api"
//! course_id = "algebra-1"
//! channel_capacity = 64
//! request_timeout_secs = 10
//! ```
//!
//! Without `api_base_url` the binary runs against the in-memory demo
//! backend.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_PATH_VAR: &str = "STUDIO_CONFIG";
pub const API_BASE_URL_VAR: &str = "STUDIO_API_BASE_URL";
pub const COURSE_ID_VAR: &str = "STUDIO_COURSE_ID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    /// Root of the REST API. `None` selects the in-memory backend.
    pub api_base_url: Option<String>,
    pub course_id: String,
    /// Request queue size of the studio actor.
    pub channel_capacity: usize,
    pub request_timeout_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            course_id: "demo-course".to_string(),
            channel_capacity: 32,
            request_timeout_secs: 30,
        }
    }
}

impl StudioConfig {
    /// Loads the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Same as [`load`](Self::load) with an explicit variable lookup.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(env);
        config.validate()?;
        info!(
            backend = config.api_base_url.as_deref().unwrap_or("memory"),
            course_id = %config.course_id,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reads a TOML file. A file that does not exist yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(API_BASE_URL_VAR) {
            self.api_base_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(course_id) = env(COURSE_ID_VAR) {
            self.course_id = course_id;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.course_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "course_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "channel_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
