//! Session lifecycle.
//!
//! A session moves through `NonExistent -> Active -> Deleted`. Every refresh
//! re-enters `Active` with a new refresh token value. All coordination is
//! delegated to the store's conditional writes; nothing here holds a lock, so
//! any number of server processes may share one store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tasklane_auth::AuthIdentity;
use tasklane_core::{AuthError, DeviceId, SessionId, UserId};
use tasklane_db::{SessionStore, StoreError};
use tasklane_models::Session;
use tracing::{debug, instrument, warn};

/// Runs a store call under `limit`, turning an elapsed deadline into a
/// retryable [`AuthError::StoreTimeout`].
///
/// On timeout `call` is dropped, which does not undo a write the store has
/// already committed.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(AuthError::from),
        Err(_) => {
            warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Credential store call timed out"
            );
            Err(AuthError::StoreTimeout(operation))
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    store_timeout: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Draws a fresh random session id.
    ///
    /// Tokens must embed the id before the session row can store the refresh
    /// token, so id generation and [`create`](Self::create) are two steps.
    pub fn generate_id(&self) -> SessionId {
        SessionId::new()
    }

    /// Persists a new session holding `refresh_token`.
    ///
    /// Fails with [`AuthError::SessionConflict`] if the id is already taken.
    #[instrument(skip(self, refresh_token), fields(session_id = %session_id, user_id = %user_id, device_id = %device_id))]
    pub async fn create(
        &self,
        session_id: SessionId,
        user_id: UserId,
        device_id: &DeviceId,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let session = Session {
            id: session_id,
            user_id,
            device_id: device_id.clone(),
            refresh_token: refresh_token.to_string(),
        };

        with_deadline(
            "save_session",
            self.store_timeout,
            self.store.save_session(&session),
        )
        .await?;

        debug!("Session created");
        Ok(())
    }

    /// Swaps the session's refresh token from `old_token` to `new_token`.
    ///
    /// One conditional update keyed on the full identity and the current
    /// token value. A stale or replayed `old_token` matches nothing and fails
    /// with [`AuthError::SessionNotFound`]; of two concurrent rotations with
    /// the same `old_token`, exactly one succeeds.
    ///
    /// A [`AuthError::StoreTimeout`] here is ambiguous: the update may have
    /// committed after the deadline fired. The session then holds a token
    /// the client never received, `old_token` is already stale, and a retry
    /// fails with `SessionNotFound`. The client has to log in again; the
    /// orphaned session stays until it is deleted.
    #[instrument(skip(self, old_token, new_token), fields(session_id = %identity.session_id, user_id = %identity.user_id, device_id = %identity.device_id))]
    pub async fn rotate(
        &self,
        identity: &AuthIdentity,
        old_token: &str,
        new_token: &str,
    ) -> Result<(), AuthError> {
        with_deadline(
            "rotate_session",
            self.store_timeout,
            self.store.rotate_session(
                &identity.device_id,
                identity.user_id,
                &identity.session_id,
                old_token,
                new_token,
            ),
        )
        .await
    }

    /// Removes the session matching all three identity keys.
    ///
    /// Deleting a session that no longer exists succeeds; no other session is
    /// ever touched.
    #[instrument(skip(self), fields(session_id = %identity.session_id, user_id = %identity.user_id, device_id = %identity.device_id))]
    pub async fn delete(&self, identity: &AuthIdentity) -> Result<(), AuthError> {
        let removed = with_deadline(
            "delete_session",
            self.store_timeout,
            self.store.delete_session(
                &identity.session_id,
                identity.user_id,
                &identity.device_id,
            ),
        )
        .await?;

        if !removed {
            debug!("Session already gone");
        }
        Ok(())
    }
}
