//! Configuration loaded from a TOML file
//!
//! Default location: `~/.config/texnouz-ocpp21/config.toml`, overridable
//! with the `OCPP21_CONFIG` environment variable. Every section and key is
//! optional.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [protocol]
//! version = "2.1"
//! request_timeout_secs = 30
//! signature_policy = "ignore"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::OcppVersion;

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV: &str = "OCPP21_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub protocol: ProtocolConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `texnouz_ocpp21=debug`.
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// What to do with incoming requests that carry no `signatures`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignaturePolicy {
    /// Accept unsigned requests. Signatures are kept as data either way.
    #[default]
    Ignore,
    /// Answer unsigned requests with a `SecurityError`.
    Require,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Protocol version spoken on connections.
    pub version: OcppVersion,
    pub request_timeout_secs: u64,
    pub signature_policy: SignaturePolicy,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: OcppVersion::V21,
            request_timeout_secs: 30,
            signature_policy: SignaturePolicy::Ignore,
        }
    }
}

impl ProtocolConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "protocol.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        match self.logging.format.to_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `$OCPP21_CONFIG`, or `config.toml` in the user's config directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("texnouz-ocpp21")
        .join("config.toml")
}
