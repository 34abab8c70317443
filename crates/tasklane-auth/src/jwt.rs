//! JWT issuing and verification.
//!
//! [`TokenCodec`] is a stateless signer/verifier for the two token kinds.
//! Verification checks the signature against the kind's secret, pins the
//! signing method to HS256 and requires `exp > now` with no leeway. It never
//! consults the session store: an access token stays valid for its whole
//! lifetime even if its session is deleted, which bounds revocation latency
//! by the access token TTL.
//!
//! # Example
//!
//! ```ignore
//! use tasklane_auth::{TokenCodec, TokenKind};
//!
//! let codec = TokenCodec::new(&jwt_config);
//! let token = codec.issue_access(&identity)?;
//! let identity = codec.verify(&token, TokenKind::Access)?;
//! ```

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use tasklane_config::JwtConfig;
use tasklane_core::{AuthError, DeviceId, SessionId, UserId};

use crate::claims::{AuthIdentity, TokenClaims, TokenKind, TokenPair};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature | TokenError::Malformed => AuthError::TokenInvalid,
            TokenError::Signing(e) => AuthError::internal(e),
        }
    }
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenCodec {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        // Expiry is checked by hand in `verify_at` so it can be exact and testable.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            access: SigningKeys::from_secret(&config.access_secret),
            refresh: SigningKeys::from_secret(&config.refresh_secret),
            access_ttl: Duration::from_secs(config.access_token_expiry.max(0) as u64),
            refresh_ttl: Duration::from_secs(config.refresh_token_expiry.max(0) as u64),
            validation,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Signs a token of `kind` for `identity`, valid for `ttl` from now.
    pub fn issue(
        &self,
        kind: TokenKind,
        identity: &AuthIdentity,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(kind, identity, ttl, Utc::now().timestamp())
    }

    /// Signs a token as if issued at `now` (Unix seconds).
    pub fn issue_at(
        &self,
        kind: TokenKind,
        identity: &AuthIdentity,
        ttl: Duration,
        now: i64,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            user_id: identity.user_id.get(),
            session_id: identity.session_id.to_string(),
            device_id: identity.device_id.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs() as i64),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.keys(kind).encoding)
            .map_err(TokenError::Signing)
    }

    pub fn issue_access(&self, identity: &AuthIdentity) -> Result<String, TokenError> {
        self.issue(TokenKind::Access, identity, self.access_ttl)
    }

    pub fn issue_refresh(&self, identity: &AuthIdentity) -> Result<String, TokenError> {
        self.issue(TokenKind::Refresh, identity, self.refresh_ttl)
    }

    /// Mints a fresh access/refresh pair bound to the same session and device.
    pub fn issue_pair(&self, identity: &AuthIdentity) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(identity)?,
            refresh_token: self.issue_refresh(identity)?,
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<AuthIdentity, TokenError> {
        self.verify_at(token, kind, Utc::now().timestamp())
    }

    /// Verifies `token` as `kind` against the clock value `now` (Unix seconds).
    pub fn verify_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: i64,
    ) -> Result<AuthIdentity, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.keys(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        let session_id = SessionId::parse(&claims.session_id).map_err(|_| TokenError::Malformed)?;
        if claims.device_id.is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(AuthIdentity {
            user_id: UserId::new(claims.user_id),
            session_id,
            device_id: DeviceId::new(claims.device_id),
        })
    }
}
