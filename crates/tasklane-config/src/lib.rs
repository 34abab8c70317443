//! # Tasklane Config
//!
//! Configuration types for the Tasklane API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`jwt`]: Token signing secrets and lifetimes
//! - [`database`]: Credential store connection settings and call deadline
//! - [`server`]: Listener address, request timeout and bcrypt cost
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`interceptor`]: Methods that bypass the request interceptor
//!
//! Every struct has a `from_env` constructor and a `from_lookup` constructor
//! that takes a key lookup function, so configuration can be built in tests
//! without touching the process environment.
//!
//! # Example
//!
//! ```ignore
//! use tasklane_config::{DatabaseConfig, InterceptorConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let database_config = DatabaseConfig::from_env()?;
//! let interceptor_config = InterceptorConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod interceptor;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use interceptor::InterceptorConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Error raised when required configuration is missing or invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Parses an optional numeric variable, falling back to `default` when unset.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
