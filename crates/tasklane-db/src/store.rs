//! Credential store contracts.
//!
//! Each capability is its own trait so a consumer can depend on exactly the
//! operations it uses. Futures are boxed so the traits stay object safe and
//! can be held as `Arc<dyn UserProvider>` and friends.

use std::future::Future;
use std::pin::Pin;

use tasklane_core::{AuthError, DeviceId, SessionId, UserId};
use tasklane_models::{Session, User};

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Creates user rows.
pub trait UserSaver: Send + Sync {
    /// Persists a new user and returns the id the store assigned.
    ///
    /// Fails with [`StoreError::UserExists`] when `login` is taken.
    fn save_user<'a>(
        &'a self,
        login: &'a str,
        password_hash: &'a [u8],
        name: &'a str,
    ) -> StoreFuture<'a, UserId>;
}

/// Reads user rows.
pub trait UserProvider: Send + Sync {
    /// Fails with [`StoreError::UserNotFound`] when no user has this login.
    fn user_by_login<'a>(&'a self, login: &'a str) -> StoreFuture<'a, User>;

    /// Fails with [`StoreError::UserNotFound`] when no user has this id.
    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, User>;
}

/// Persists sessions and their current refresh token.
pub trait SessionStore: Send + Sync {
    /// Inserts a session row.
    ///
    /// Fails with [`StoreError::SessionExists`] when the session id is taken.
    fn save_session<'a>(&'a self, session: &'a Session) -> StoreFuture<'a, ()>;

    /// Replaces the stored refresh token with `new_token`, but only when the
    /// row matches all of `(device_id, user_id, session_id)` and currently
    /// stores `old_token`.
    ///
    /// This is a single compare-and-swap. When nothing matches it fails with
    /// [`StoreError::SessionNotFound`], so of two callers presenting the same
    /// old token exactly one succeeds.
    fn rotate_session<'a>(
        &'a self,
        device_id: &'a DeviceId,
        user_id: UserId,
        session_id: &'a SessionId,
        old_token: &'a str,
        new_token: &'a str,
    ) -> StoreFuture<'a, ()>;

    /// Deletes the session matching all three keys.
    ///
    /// Returns whether a row was removed. A missing session is not an error.
    fn delete_session<'a>(
        &'a self,
        session_id: &'a SessionId,
        user_id: UserId,
        device_id: &'a DeviceId,
    ) -> StoreFuture<'a, bool>;
}

/// Errors raised by credential store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("session already exists")]
    SessionExists,

    #[error("session not found")]
    SessionNotFound,

    /// No connection became available in time.
    #[error("credential store unavailable")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::Unavailable,
            err => Self::Database(err),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserExists => AuthError::UserExists,
            StoreError::UserNotFound => AuthError::UserNotFound,
            StoreError::SessionExists => AuthError::SessionConflict,
            StoreError::SessionNotFound => AuthError::SessionNotFound,
            StoreError::Unavailable => AuthError::StoreTimeout("connection acquire"),
            err @ StoreError::Database(_) => AuthError::internal(err),
        }
    }
}
