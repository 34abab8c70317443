//! Error types for the Tasklane API.
//!
//! Two layers of errors live here:
//!
//! - [`AuthError`]: the domain taxonomy produced by the credential store,
//!   token codec, session manager and auth service. Every variant has a
//!   stable machine-readable [`code`](AuthError::code).
//! - [`AppError`]: the HTTP-facing error returned by handlers. It carries a
//!   status, the stable code and the underlying error, and renders as
//!   `{"error": "...", "code": "..."}`.
//!
//! Internal failures never leak their message to the client. They are logged
//! with full context when the response is rendered.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Domain errors of the authentication and session lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Request input rejected before any store access.
    #[error("{0}")]
    Validation(String),

    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    /// A session with the generated id already exists.
    #[error("session already exists")]
    SessionConflict,

    /// The session is gone, or the presented refresh token is not the current one.
    #[error("session not found")]
    SessionNotFound,

    #[error("invalid token")]
    TokenInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("missing request metadata")]
    MissingMetadata,

    #[error("missing authorization header")]
    MissingAuthHeader,

    #[error("malformed authorization header, expected `Bearer <token>`")]
    MalformedAuthHeader,

    /// A credential store call did not complete before its deadline.
    #[error("credential store timed out during {0}")]
    StoreTimeout(&'static str),

    #[error("password hashing failed")]
    Hashing(#[source] bcrypt::BcryptError),

    #[error(transparent)]
    Internal(#[from] Error),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::Internal(err.into())
    }

    /// Stable, client-visible error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::UserExists => "user_exists",
            Self::UserNotFound => "user_not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::SessionConflict => "session_conflict",
            Self::SessionNotFound => "session_not_found",
            Self::TokenInvalid => "token_invalid",
            Self::TokenExpired => "token_expired",
            Self::MissingMetadata => "missing_metadata",
            Self::MissingAuthHeader => "missing_auth_header",
            Self::MalformedAuthHeader => "malformed_auth_header",
            Self::StoreTimeout(_) => "store_unavailable",
            Self::Hashing(_) | Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UserExists | Self::SessionConflict => StatusCode::CONFLICT,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials
            | Self::SessionNotFound
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::MissingMetadata
            | Self::MissingAuthHeader
            | Self::MalformedAuthHeader => StatusCode::UNAUTHORIZED,
            Self::StoreTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Hashing(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only store deadline failures may be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreTimeout(_))
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, code: &'static str, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code,
            error: err.into(),
        }
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            anyhow::anyhow!(message.into()),
        )
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self::new(err.status(), err.code(), err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(
                code = self.code,
                error = ?self.error,
                "Request failed with internal error"
            );
            match self.status {
                StatusCode::SERVICE_UNAVAILABLE => "service temporarily unavailable".to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            self.error.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.code,
        }));

        let mut response = (self.status, body).into_response();
        response.extensions_mut().insert(ErrorCode(self.code));
        response
    }
}

/// Stable error code of a rendered [`AppError`], left in the response
/// extensions for request logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);
