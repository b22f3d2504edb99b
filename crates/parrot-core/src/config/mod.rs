//! Configuration system for parrot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

use crate::error::{ParrotError, ParrotResult};

/// Which persistence backend to use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendKind {
    /// Embedded SQLite key-value table.
    #[default]
    Sqlite,
    /// One encoded record per line in a text file.
    FlatFile,
}

impl BackendKind {
    fn default_file_name(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "triggers.db",
            BackendKind::FlatFile => "triggers.txt",
        }
    }
}

/// Trigger store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend variant.
    pub backend: BackendKind,
    /// Store location. Defaults to a backend-specific file under `~/.parrot`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured path, or the default location for the backend.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir().join(self.backend.default_file_name()))
    }

    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> ParrotResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| ParrotError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ParrotError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| ParrotError::Configuration(e.to_string())),
            _ => Err(ParrotError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `PARROT_BACKEND` (`sqlite` or `flat_file`, default: sqlite)
    /// - `PARROT_STORE_PATH` (default: backend file under `~/.parrot`)
    pub fn from_env() -> ParrotResult<Self> {
        let mut config = Self::default();

        if let Ok(backend) = std::env::var("PARROT_BACKEND") {
            config.backend = backend.trim().to_lowercase().parse().map_err(|_| {
                ParrotError::Configuration(format!(
                    "PARROT_BACKEND must be 'sqlite' or 'flat_file', got '{}'",
                    backend
                ))
            })?;
        }

        if let Ok(path) = std::env::var("PARROT_STORE_PATH") {
            config.path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Default data directory (`~/.parrot`, or `.parrot` without a home directory).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".parrot"))
        .unwrap_or_else(|| PathBuf::from(".parrot"))
}

/// Builder for StoreConfig.
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the backend variant.
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the store path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StoreConfig {
        self.config
    }
}
