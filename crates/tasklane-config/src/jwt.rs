use std::env;

use crate::{ConfigError, parse_or};

/// Token signing configuration.
///
/// Access and refresh tokens are signed with independent secrets so a token
/// of one kind can never verify as the other. Both secrets are required and
/// have no default.
#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expiry: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = lookup("JWT_ACCESS_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_ACCESS_SECRET"))?;
        let refresh_secret = lookup("JWT_REFRESH_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_REFRESH_SECRET"))?;

        let config = Self {
            access_secret,
            refresh_secret,
            access_token_expiry: parse_or(&lookup, "JWT_ACCESS_EXPIRY", 900)?, // 15 minutes
            refresh_token_expiry: parse_or(&lookup, "JWT_REFRESH_EXPIRY", 2_592_000)?, // 30 days
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_SECRET",
                reason: "must differ from JWT_ACCESS_SECRET".to_string(),
            });
        }
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_ACCESS_EXPIRY",
                reason: "must be positive".to_string(),
            });
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_EXPIRY",
                reason: "must be longer than JWT_ACCESS_EXPIRY".to_string(),
            });
        }
        Ok(())
    }
}
