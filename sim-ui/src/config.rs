//! Client configuration, read from a TOML file.
//!
//! ```toml
//! base_url    = "http://127.0.0.1:8000"
//! debounce_ms = 350
//! session_file = ".pfpj/session.toml"
//! export_dir  = "."
//! assets      = ["static/logo.png"]
//! ```
//!
//! Every key is optional. A missing file yields [`ClientConfig::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// File looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pfpj.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Root URL of the calculation service; endpoint paths are appended.
    pub base_url: String,
    /// Quiet period of the input debounce, in milliseconds.
    pub debounce_ms: u64,
    pub session_file: PathBuf,
    pub export_dir: PathBuf,
    /// Files embedded in the printable report; export waits for all of
    /// them to finish loading.
    pub assets: Vec<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            debounce_ms: 350,
            session_file: PathBuf::from(".pfpj/session.toml"),
            export_dir: PathBuf::from("."),
            assets: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    /// * [`ConfigError::Read`] for I/O failures other than not-found.
    /// * [`ConfigError::Parse`] for malformed TOML or unknown keys.
    /// * [`ConfigError::Invalid`] when a value fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config = Self::from_toml(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "debounce_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
