//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Algoan API base URL
    pub algoan_base_url: String,

    /// Connector credentials on Algoan
    pub algoan_client_id: String,
    pub algoan_client_secret: String,

    /// Bridge API base URL
    pub bridge_base_url: String,

    /// Salt mixed into derived Bridge user passwords
    pub bridge_password_salt: String,

    /// Public URL of `POST /hooks`; subscriptions are registered when set
    pub hooks_target_url: Option<String>,

    /// Secret shared by every webhook subscription of the connector
    pub hooks_secret: String,

    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingEnv(key));

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let algoan_base_url = required("ALGOAN_BASE_URL")?;
        let algoan_client_id = required("ALGOAN_CLIENT_ID")?;
        let algoan_client_secret = required("ALGOAN_CLIENT_SECRET")?;

        let bridge_base_url =
            lookup("BRIDGE_BASE_URL").unwrap_or_else(|| "https://sync.bankin.com".to_string());
        let bridge_password_salt = required("BRIDGE_PASSWORD_SALT")?;

        let hooks_target_url = lookup("HOOKS_TARGET_URL").filter(|url| !url.is_empty());
        let hooks_secret = required("HOOKS_SECRET")?;
        if hooks_secret.is_empty() {
            return Err(ConfigError::InvalidValue("HOOKS_SECRET"));
        }

        let http_timeout_secs: u64 = lookup("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS"))?;

        Ok(Self {
            host,
            port,
            environment,
            algoan_base_url,
            algoan_client_id,
            algoan_client_secret,
            bridge_base_url,
            bridge_password_salt,
            hooks_target_url,
            hooks_secret,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
