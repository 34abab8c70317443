//! Request interceptor configuration.
//!
//! The interceptor gates every RPC method behind a verified access token
//! except the methods listed here. The set is built once at start-up and
//! handed to the interceptor; nothing about it is global.
//!
//! # Environment Variables
//!
//! - `AUTH_PUBLIC_METHODS`: comma-separated method names that bypass
//!   authentication. Defaults to Register and Login.

use std::collections::HashSet;
use std::env;

use tasklane_core::methods;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptorConfig {
    public_methods: HashSet<String>,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self::with_public_methods([methods::REGISTER, methods::LOGIN])
    }
}

impl InterceptorConfig {
    pub fn with_public_methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_methods: methods.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("AUTH_PUBLIC_METHODS") {
            Some(raw) => Self::with_public_methods(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            None => Self::default(),
        }
    }

    pub fn is_public(&self, method: &str) -> bool {
        self.public_methods.contains(method)
    }
}
