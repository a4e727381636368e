//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL (e.g. `sqlite://ledger.db`)
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// How long an operation waits for a pooled connection
    pub database_acquire_timeout: Duration,

    /// How long a writer waits for the store's write lock
    pub database_busy_timeout: Duration,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Configuration with defaults for everything but the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_max_connections: 10,
            database_acquire_timeout: Duration::from_millis(3000),
            database_busy_timeout: Duration::from_millis(5000),
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;
        let defaults = Self::new(database_url);

        let database_max_connections = parse_or(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            defaults.database_max_connections,
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"));
        }

        let acquire_ms = parse_or(
            &lookup,
            "DATABASE_ACQUIRE_TIMEOUT_MS",
            defaults.database_acquire_timeout.as_millis() as u64,
        )?;
        let busy_ms = parse_or(
            &lookup,
            "DATABASE_BUSY_TIMEOUT_MS",
            defaults.database_busy_timeout.as_millis() as u64,
        )?;

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let environment = lookup("ENVIRONMENT").unwrap_or(defaults.environment);

        Ok(Self {
            database_url: defaults.database_url,
            database_max_connections,
            database_acquire_timeout: Duration::from_millis(acquire_ms),
            database_busy_timeout: Duration::from_millis(busy_ms),
            host,
            port,
            environment,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_database_url_required() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingEnv("DATABASE_URL"))));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")])).unwrap();
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.database_busy_timeout, Duration::from_millis(5000));
        assert_eq!(config.port, 3000);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://ledger.db"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_ACQUIRE_TIMEOUT_MS", "250"),
            ("PORT", "8080"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 4);
        assert_eq!(config.database_acquire_timeout, Duration::from_millis(250));
        assert_eq!(config.port, 8080);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_values() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://ledger.db"),
            ("PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue("PORT"))));

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://ledger.db"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))
        ));
    }
}
