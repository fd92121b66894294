//! Configuration management for WDI Fetcher
//!
//! This module provides unified configuration loading with multi-source
//! precedence: built-in defaults, an optional TOML config file, and
//! environment variable overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{CacheConfig, ClientConfig};
use crate::constants::{env, logging};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Cache gateway settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP client settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = if let Some(path) = config_file_override {
            if !path.exists() {
                return Err(ConfigError::NotFound { path });
            }
            Some(path)
        } else {
            Self::find_config_file()
        };

        let mut config = if let Some(path) = config_path {
            Self::load_from_file(&path).await?
        } else {
            debug!("No config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Find a configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from("./wdi-fetcher.toml")];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }
        None
    }

    /// Default config file path for the current user
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wdi-fetcher").join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &PathBuf) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Apply environment variable overrides on top of file/default values
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(env::REDIS_URL) {
            debug!("Overriding redis_url from {}", env::REDIS_URL);
            self.cache.redis_url = url;
        }
        if let Ok(url) = std::env::var(env::API_BASE_URL) {
            debug!("Overriding base_url from {}", env::API_BASE_URL);
            self.client.base_url = url;
        }
    }
}
