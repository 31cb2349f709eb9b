use serde::Deserialize;

use crate::infrastructure::api_key::{DEFAULT_KEY_LENGTH, DEFAULT_PREFIX_LENGTH};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Credential subsystem configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Process-wide encryption secret as 64 hex characters. When unset, an
    /// ephemeral secret is generated at startup and issued credentials do
    /// not survive a restart.
    #[serde(default)]
    pub encryption_secret: Option<String>,
    /// Raw API key length in bytes
    pub api_key_length: usize,
    /// Storage prefix length in bytes
    pub api_key_prefix_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Key store backend: "memory" or "postgres"
    pub backend: String,
    /// PostgreSQL connection URL; falls back to the DATABASE_URL
    /// environment variable
    #[serde(default)]
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            encryption_secret: None,
            api_key_length: DEFAULT_KEY_LENGTH,
            api_key_prefix_length: DEFAULT_PREFIX_LENGTH,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.api_key_length, 32);
        assert_eq!(config.auth.api_key_prefix_length, 8);
        assert!(config.auth.encryption_secret.is_none());
        assert_eq!(config.storage.backend, "memory");
    }
}
