//! Credential store connection settings.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: SQLite connection string (default `sqlite://storage/tasklane.db?mode=rwc`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default 5)
//! - `DATABASE_ACQUIRE_TIMEOUT`: seconds to wait for a pooled connection (default 5)
//! - `STORE_TIMEOUT`: per-call deadline in milliseconds for store operations (default 3000)

use std::env;
use std::time::Duration;

use crate::{ConfigError, parse_or};

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub store_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://storage/tasklane.db?mode=rwc".to_string()),
            max_connections,
            acquire_timeout: Duration::from_secs(parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT", 5)?),
            store_timeout: Duration::from_millis(parse_or(&lookup, "STORE_TIMEOUT", 3000)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lookup_from;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.url, "sqlite://storage/tasklane.db?mode=rwc");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.store_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn test_overrides() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "1"),
            ("STORE_TIMEOUT", "250"),
        ]))
        .unwrap();
        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_zero_connections_rejected() {
        let result = DatabaseConfig::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", "0")]));
        assert!(result.is_err());
    }
}
