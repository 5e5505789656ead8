//! Client configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! Every value has a default so a client can start without any environment at all.

use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_RUST_LOG, DEFAULT_STORAGE_PATH,
};

/// Global client configuration (lazily initialized)
pub static CONFIG: LazyLock<ClientConfig> =
    LazyLock::new(|| ClientConfig::from_env().unwrap_or_default());

/// Main client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

/// Remote API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Device-local storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub rust_log: String,
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api: ApiConfig::from_env()?,
            storage: StorageConfig::from_env(),
            log: LogConfig::from_env()?,
        })
    }

    /// Configuration pointing at a specific API, used by tests and embedders
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            ..Self::default()
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            rust_log: DEFAULT_RUST_LOG.to_string(),
            json: false,
        }
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("CAMPAIGN_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue("CAMPAIGN_API_URL".to_string()));
        }

        let timeout_secs = env::var("CAMPAIGN_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_API_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("CAMPAIGN_API_TIMEOUT_SECS".to_string()))?;

        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("CAMPAIGN_API_TIMEOUT_SECS".to_string()));
        }

        Ok(Self {
            base_url,
            timeout_secs,
        })
    }

    /// Network ceiling as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            path: PathBuf::from(
                env::var("CAMPAIGN_STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_string()),
            ),
        }
    }
}

impl LogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.to_string()),
            json: env::var("CAMPAIGN_LOG_JSON")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CAMPAIGN_LOG_JSON".to_string()))?,
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
