//! Configuration management for the PestCheck client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PESTCHECK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// REST API configuration
    pub api: ApiConfig,

    /// Polling intervals for background widgets
    pub polling: PollingConfig,

    /// Session persistence configuration
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://pestcheck.example.com/api`
    pub base_url: String,

    /// Which backend implementation to build
    pub backend: BackendKind,

    /// Request timeout in seconds. Deliberately long: the inference backend
    /// cold-starts and the first request after idle can take a minute.
    pub request_timeout_secs: u64,
}

/// Backend selection, replacing the original build-time mock flag
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Real REST backend over HTTP
    Rest,
    /// In-memory mock with seeded data
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    /// Alert banner poll interval in seconds
    pub alert_interval_secs: u64,

    /// Notification bell poll interval in seconds
    pub notification_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Path of the persisted session file
    pub path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("PESTCHECK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:8000/api")?
            .set_default("api.backend", "rest")?
            .set_default("api.request_timeout_secs", 90)?
            .set_default("polling.alert_interval_secs", 300)?
            .set_default("polling.notification_interval_secs", 30)?
            .set_default("session.path", ".pestcheck/session.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PESTCHECK_ prefix)
            .add_source(
                Environment::with_prefix("PESTCHECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            alert_interval_secs: 300,
            notification_interval_secs: 30,
        }
    }
}
