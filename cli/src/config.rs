//! Configuration file for the `keystore` command.
//!
//! Configuration lives at `~/.keystore-cli/config.toml` unless `--config`
//! names another file. A missing file yields the defaults; every field is
//! optional.
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:3000"
//! timeout_secs = 30
//! html_payload_header = true
//!
//! [logging]
//! format = "compact"
//!
//! [keystore]
//! name = "main"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use keystore_core::client::SKIP_BROWSER_WARNING;
use keystore_core::{ApiError, ClientConfig};
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

/// The default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// The default base directory name within the home directory.
const BASE_DIR_NAME: &str = ".keystore-cli";

/// Origin of a locally running service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDirectory,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub keystore: KeystoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Service origin; `/api/crypto/` is appended.
    pub base_url: String,

    /// Overall deadline per request. No deadline when unset.
    pub timeout_secs: Option<u64>,

    /// Send the tunnel's browser-warning bypass header on every request.
    pub html_payload_header: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            html_payload_header: true,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Client settings for `origin`, or for the configured origin when `None`.
    pub fn client_config(&self, origin: Option<&str>) -> Result<ClientConfig, ApiError> {
        let config = ClientConfig::for_origin(origin.unwrap_or(&self.base_url))?;
        Ok(if self.html_payload_header {
            config.with_default_header(SKIP_BROWSER_WARNING.0, SKIP_BROWSER_WARNING.1)
        } else {
            config
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Keystore used when neither `--keystore` nor `KEYSTORE_NAME` is given.
    pub name: Option<String>,
}

/// Reads the configuration file from a base directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Loader rooted at `~/.keystore-cli`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] if the home directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    #[must_use]
    pub const fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML and
    /// [`ConfigError::Io`] when the file cannot be read.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config_path = self.config_path();
        if !config_path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load an explicitly named file. Unlike [`load`](Self::load), a missing
    /// file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] for invalid TOML.
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            context: format!("failed to read configuration from {}", path.display()),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Load `explicit` when given, otherwise the default location.
///
/// # Errors
///
/// See [`ConfigLoader::load`] and [`ConfigLoader::load_from_path`].
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => ConfigLoader::load_from_path(path),
        None => ConfigLoader::new()?.load(),
    }
}
