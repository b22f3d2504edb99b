//! Bot configuration from the environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use parrot_core::StoreConfig;

/// Chat id used by the console transport when none is configured.
pub const DEFAULT_CHAT_ID: i64 = 1;

/// Runtime configuration for the bot binary.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub store: StoreConfig,
    /// Chat the console transport pretends to be.
    pub chat_id: i64,
    /// Username reported for the local console user.
    pub username: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            chat_id: DEFAULT_CHAT_ID,
            username: None,
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `PARROT_CONFIG` - store config file (.toml/.json/.yaml); when unset
    ///   the store is configured from `PARROT_BACKEND`/`PARROT_STORE_PATH`
    /// - `PARROT_CHAT_ID` (default: 1)
    /// - `PARROT_USERNAME` (optional)
    pub fn from_env() -> Result<Self> {
        let store = match std::env::var("PARROT_CONFIG") {
            Ok(path) => {
                let path = PathBuf::from(path);
                StoreConfig::from_file(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?
            }
            Err(_) => StoreConfig::from_env().context("invalid store configuration")?,
        };

        let chat_id = match std::env::var("PARROT_CHAT_ID") {
            Ok(raw) => parse_chat_id(&raw)?,
            Err(_) => DEFAULT_CHAT_ID,
        };

        let username = std::env::var("PARROT_USERNAME")
            .ok()
            .filter(|name| !name.trim().is_empty());

        Ok(Self {
            store,
            chat_id,
            username,
        })
    }
}

fn parse_chat_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .with_context(|| format!("PARROT_CHAT_ID must be an integer, got '{}'", raw))
}
