//! Token claim structures.
//!
//! - [`TokenClaims`]: the wire claim set signed into every token
//! - [`AuthIdentity`]: the verified identity decoded from a token
//! - [`TokenPair`]: an access/refresh pair handed to the client

use serde::{Deserialize, Serialize};
use tasklane_core::{DeviceId, SessionId, UserId};
use utoipa::ToSchema;

/// The two token kinds. Each is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Claims signed into access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    pub session_id: String,
    pub device_id: String,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expires-at (Unix timestamp, seconds)
    pub exp: i64,
    /// Unique token identifier, so two tokens minted in the same second differ
    pub jti: String,
}

/// The identity carried by a verified token.
///
/// Only [`TokenCodec::verify`](crate::TokenCodec::verify) produces this from
/// a token; handlers receive it from the interceptor and never from request
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub device_id: DeviceId,
}

impl AuthIdentity {
    pub fn new(user_id: UserId, session_id: SessionId, device_id: DeviceId) -> Self {
        Self {
            user_id,
            session_id,
            device_id,
        }
    }
}

/// Access and refresh token issued together.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}
