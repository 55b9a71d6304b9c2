//! # Configuration
//!
//! Environment-based configuration for the reminder bot.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Split storage settings out so the editor binary can load them alone
//! - 1.0.0: Initial creation

use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Required length of the at-rest encryption key (AES-256).
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Storage-only settings, shared by the bot and the reminder editor.
#[derive(Clone)]
pub struct StorageConfig {
    /// Path of the encrypted reminder artifact.
    pub reminders_path: PathBuf,
    /// 32-byte AES-256 key.
    pub encryption_key: [u8; ENCRYPTION_KEY_LEN],
}

impl StorageConfig {
    /// Load storage settings from the environment.
    ///
    /// Fails fast if `ENCRYPTION_KEY` is absent or not exactly 32 bytes.
    pub fn from_env() -> Result<Self> {
        let raw_key = std::env::var("ENCRYPTION_KEY")
            .map_err(|_| anyhow!("ENCRYPTION_KEY is not set in the environment"))?;

        let bytes = raw_key.as_bytes();
        if bytes.len() != ENCRYPTION_KEY_LEN {
            return Err(anyhow!(
                "ENCRYPTION_KEY must be exactly {} bytes (256 bits), got {}",
                ENCRYPTION_KEY_LEN,
                bytes.len()
            ));
        }

        let mut encryption_key = [0u8; ENCRYPTION_KEY_LEN];
        encryption_key.copy_from_slice(bytes);

        let reminders_path = std::env::var("REMINDERS_PATH")
            .unwrap_or_else(|_| "reminders.enc".to_string())
            .into();

        Ok(StorageConfig {
            reminders_path,
            encryption_key,
        })
    }
}

/// Full bot configuration.
#[derive(Clone)]
pub struct Config {
    /// Chat gateway credential.
    pub discord_token: String,
    /// At-rest storage settings.
    pub storage: StorageConfig,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    /// Load the full configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow!("DISCORD_TOKEN is not set in the environment"))?;

        let storage = StorageConfig::from_env()?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            discord_token,
            storage,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state, so they all run under one test
    // to avoid racing each other.
    #[test]
    fn test_storage_config_key_validation() {
        std::env::remove_var("ENCRYPTION_KEY");
        assert!(StorageConfig::from_env().is_err());

        std::env::set_var("ENCRYPTION_KEY", "too-short");
        assert!(StorageConfig::from_env().is_err());

        std::env::set_var("ENCRYPTION_KEY", "0123456789abcdef0123456789abcdef");
        let config = StorageConfig::from_env().expect("valid key should load");
        assert_eq!(config.encryption_key.len(), ENCRYPTION_KEY_LEN);
        assert_eq!(config.reminders_path, PathBuf::from("reminders.enc"));

        std::env::remove_var("ENCRYPTION_KEY");
    }
}
