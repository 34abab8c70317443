//! # Tasklane Auth
//!
//! Token codec and authentication claims for the Tasklane API.
//!
//! This crate provides:
//!
//! - [`claims`]: the signed claim set, the verified [`AuthIdentity`] and [`TokenPair`]
//! - [`jwt`]: the [`TokenCodec`] that issues and verifies tokens
//!
//! # Token Types
//!
//! - **Access Token**: short-lived, presented on every authenticated call
//! - **Refresh Token**: long-lived, exchanged exactly once for a new pair
//!
//! Both kinds carry the same identity claims (user id, session id, device id)
//! and are signed with independent secrets.
//!
//! # Example
//!
//! ```ignore
//! use tasklane_auth::{AuthIdentity, TokenCodec, TokenKind};
//! use tasklane_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env()?);
//! let pair = codec.issue_pair(&identity)?;
//!
//! let verified = codec.verify(&pair.access_token, TokenKind::Access)?;
//! assert_eq!(verified, identity);
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{AuthIdentity, TokenClaims, TokenKind, TokenPair};
pub use jwt::{TokenCodec, TokenError};
