//! `apiver` configuration file.
//!
//! Loaded from `.apiver/config.toml` unless `--config` names another file.
//! A missing default file means "all defaults"; a missing explicit file is an
//! error. Environment variables and flags are applied on top by `main`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use pipeline::ApiVersion;
use serde::Deserialize;

/// Path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".apiver/config.toml";

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Outgoing request settings.
    pub client: ClientConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// `[client]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URI that relative targets are resolved against.
    pub endpoint: Option<String>,
    /// Value enforced for `api-version` on every request.
    pub api_version: ApiVersion,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra query parameters enforced on every request, applied before
    /// `api-version`.
    pub default_query: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_version: ApiVersion::new("v1"),
            timeout_secs: 30,
            default_query: BTreeMap::new(),
        }
    }
}

/// Output format for log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Event format.
    pub format: LogFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from `explicit`, or from
    /// [`DEFAULT_CONFIG_PATH`] if it exists, or falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
