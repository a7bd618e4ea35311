//! Configuration management for the AgroIntel decision engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AGRO_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Treatment plan storage configuration
    pub store: StoreConfig,

    /// Reference table configuration
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Historical weather API configuration
    pub weather: WeatherConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which Plan Store adapter to use
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
    Postgres,
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::File => "file",
            StoreBackend::Postgres => "postgres",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// JSON document path for the file backend
    pub file_path: String,

    /// PostgreSQL settings for the postgres backend
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReferenceConfig {
    /// Optional JSON file replacing the built-in reference tables
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Whether to call the historical weather API at all
    pub enabled: bool,

    /// Historical weather API base URL
    pub api_endpoint: String,

    /// Days of history summarized for a prediction
    pub period_days: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "memory")?
            .set_default("store.file_path", "data/treatment_plans.json")?
            .set_default("store.database.max_connections", 10)?
            .set_default("store.database.min_connections", 2)?
            .set_default("weather.enabled", true)?
            .set_default("weather.api_endpoint", "https://archive-api.open-meteo.com/v1")?
            .set_default("weather.period_days", 90)?
            .set_default("weather.timeout_secs", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO_ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            store: StoreConfig {
                backend: StoreBackend::Memory,
                file_path: "data/treatment_plans.json".to_string(),
                database: DatabaseConfig {
                    url: String::new(),
                    max_connections: 10,
                    min_connections: 2,
                },
            },
            reference: ReferenceConfig::default(),
            weather: WeatherConfig {
                enabled: false,
                api_endpoint: "https://archive-api.open-meteo.com/v1".to_string(),
                period_days: 90,
                timeout_secs: 10,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_matches_config_value() {
        for name in ["memory", "file", "postgres"] {
            let backend: StoreBackend = serde_json::from_value(serde_json::json!(name)).unwrap();
            assert_eq!(backend.name(), name);
        }
    }

    #[test]
    fn test_default_uses_memory_store() {
        let config = Config::default();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(!config.weather.enabled);
    }
}
