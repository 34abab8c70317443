//! SQLite-backed credential store.

use sqlx::SqlitePool;
use tasklane_core::{DeviceId, SessionId, UserId};
use tasklane_models::{Session, User};
use tracing::debug;

use crate::store::{SessionStore, StoreError, StoreFuture, UserProvider, UserSaver};

/// Credential store over a SQLx SQLite pool. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

impl UserSaver for SqliteStore {
    fn save_user<'a>(
        &'a self,
        login: &'a str,
        password_hash: &'a [u8],
        name: &'a str,
    ) -> StoreFuture<'a, UserId> {
        Box::pin(async move {
            let result = sqlx::query("INSERT INTO users (login, name, hash_password) VALUES (?, ?, ?)")
                .bind(login)
                .bind(name)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        StoreError::UserExists
                    } else {
                        e.into()
                    }
                })?;

            Ok(UserId::new(result.last_insert_rowid()))
        })
    }
}

impl UserProvider for SqliteStore {
    fn user_by_login<'a>(&'a self, login: &'a str) -> StoreFuture<'a, User> {
        Box::pin(async move {
            sqlx::query_as::<_, User>(
                "SELECT id, login, name, hash_password FROM users WHERE login = ?",
            )
            .bind(login)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserNotFound)
        })
    }

    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, User> {
        Box::pin(async move {
            sqlx::query_as::<_, User>("SELECT id, login, name, hash_password FROM users WHERE id = ?")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::UserNotFound)
        })
    }
}

impl SessionStore for SqliteStore {
    fn save_session<'a>(&'a self, session: &'a Session) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO sessions (id, refresh_token, session_user_id, device_id) VALUES (?, ?, ?, ?)",
            )
            .bind(session.id.to_string())
            .bind(&session.refresh_token)
            .bind(session.user_id.get())
            .bind(session.device_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::SessionExists
                } else if is_foreign_key_violation(&e) {
                    StoreError::UserNotFound
                } else {
                    e.into()
                }
            })?;

            Ok(())
        })
    }

    fn rotate_session<'a>(
        &'a self,
        device_id: &'a DeviceId,
        user_id: UserId,
        session_id: &'a SessionId,
        old_token: &'a str,
        new_token: &'a str,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE sessions SET refresh_token = ? \
                 WHERE device_id = ? AND session_user_id = ? AND id = ? AND refresh_token = ?",
            )
            .bind(new_token)
            .bind(device_id.as_str())
            .bind(user_id.get())
            .bind(session_id.to_string())
            .bind(old_token)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                debug!(session_id = %session_id, "Rotation matched no session");
                return Err(StoreError::SessionNotFound);
            }

            Ok(())
        })
    }

    fn delete_session<'a>(
        &'a self,
        session_id: &'a SessionId,
        user_id: UserId,
        device_id: &'a DeviceId,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                "DELETE FROM sessions WHERE id = ? AND session_user_id = ? AND device_id = ?",
            )
            .bind(session_id.to_string())
            .bind(user_id.get())
            .bind(device_id.as_str())
            .execute(&self.pool)
            .await?;

            Ok(result.rows_affected() > 0)
        })
    }
}
