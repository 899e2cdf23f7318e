//! # Configuration Management Module
//!
//! Type-safe TOML configuration with serde, defaults and validation.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - HTTP listen address
//! - [`StorageConfig`] - where the pet record lives
//! - [`LoggingConfig`] - log level and optional log file
//! - [`PetConfig`] - default name and optional deterministic event seed
//! - [`AgentConfig`] - how the tool adapter reaches the HTTP service
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chickpet::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Listening on {}", config.server.listen_addr());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0"
//! port = 8000
//!
//! [storage]
//! data_dir = "./data"
//! pet_file = "tamagotchi.json"
//!
//! [pet]
//! default_name = "Chick"
//! ```
//!
//! Every section may be omitted; missing sections take their defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::pet::types::MAX_NAME_CHARS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pet: PetConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// File name of the pet record inside `data_dir`
    pub pet_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            pet_file: "tamagotchi.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parse `level`; unknown values fall back to `Info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetConfig {
    /// Name given to every newly laid egg
    pub default_name: String,
    /// Seed for the random event generator. Unset means seeded from OS entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_seed: Option<u64>,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            default_name: "Chick".to_string(),
            event_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the pet HTTP service
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u32,
    /// Extra attempts after a connection failure (never used for rejected requests)
    pub connect_retries: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 5,
            connect_retries: 2,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be non-zero"));
        }
        if self.storage.pet_file.trim().is_empty() {
            return Err(anyhow!("storage.pet_file must not be empty"));
        }
        let name_len = self.pet.default_name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_CHARS {
            return Err(anyhow!(
                "pet.default_name must be 1-{} characters",
                MAX_NAME_CHARS
            ));
        }
        if self.agent.timeout_seconds == 0 {
            return Err(anyhow!("agent.timeout_seconds must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen_addr(), "0.0.0.0:8000");
        assert_eq!(config.storage.pet_file, "tamagotchi.json");
        assert_eq!(config.pet.default_name, "Chick");
        assert_eq!(config.pet.event_seed, None);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let config: Config = toml::from_str("[server]\nbind = \"127.0.0.1\"\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.agent.connect_retries, 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pet.default_name = "x".repeat(21);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.pet_file = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.agent.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_filter_fallback() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
        logging.level = "debug".to_string();
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
        logging.level = "chatty".to_string();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }

    #[tokio::test]
    async fn test_create_default_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.server.port, 8000);
        assert_eq!(loaded.pet.default_name, "Chick");
    }
}
