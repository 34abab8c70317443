//! In-process credential store.
//!
//! Mirrors the SQLite backend's semantics, including unique logins and the
//! compare-and-swap rotation, behind a single mutex. Useful for tests and
//! single-process tooling.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tasklane_core::{DeviceId, SessionId, UserId};
use tasklane_models::{Session, User};

use crate::store::{SessionStore, StoreError, StoreFuture, UserProvider, UserSaver};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, Session>,
    next_user_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // Every critical section leaves the maps consistent, so a poisoned
        // lock still guards valid data.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_count(&self) -> usize {
        self.tables().sessions.len()
    }

    /// Current refresh token of a session, if it exists.
    pub fn refresh_token_of(&self, session_id: &SessionId) -> Option<String> {
        self.tables()
            .sessions
            .get(session_id)
            .map(|s| s.refresh_token.clone())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables();
        f.debug_struct("MemoryStore")
            .field("users", &tables.users.len())
            .field("sessions", &tables.sessions.len())
            .finish()
    }
}

impl UserSaver for MemoryStore {
    fn save_user<'a>(
        &'a self,
        login: &'a str,
        password_hash: &'a [u8],
        name: &'a str,
    ) -> StoreFuture<'a, UserId> {
        Box::pin(async move {
            let mut tables = self.tables();
            if tables.users.values().any(|u| u.login == login) {
                return Err(StoreError::UserExists);
            }

            tables.next_user_id += 1;
            let id = UserId::new(tables.next_user_id);
            tables.users.insert(
                id,
                User {
                    id,
                    login: login.to_string(),
                    name: name.to_string(),
                    password_hash: password_hash.to_vec(),
                },
            );
            Ok(id)
        })
    }
}

impl UserProvider for MemoryStore {
    fn user_by_login<'a>(&'a self, login: &'a str) -> StoreFuture<'a, User> {
        Box::pin(async move {
            self.tables()
                .users
                .values()
                .find(|u| u.login == login)
                .cloned()
                .ok_or(StoreError::UserNotFound)
        })
    }

    fn user_by_id(&self, id: UserId) -> StoreFuture<'_, User> {
        Box::pin(async move {
            self.tables()
                .users
                .get(&id)
                .cloned()
                .ok_or(StoreError::UserNotFound)
        })
    }
}

impl SessionStore for MemoryStore {
    fn save_session<'a>(&'a self, session: &'a Session) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut tables = self.tables();
            if !tables.users.contains_key(&session.user_id) {
                return Err(StoreError::UserNotFound);
            }
            if tables.sessions.contains_key(&session.id) {
                return Err(StoreError::SessionExists);
            }
            tables.sessions.insert(session.id, session.clone());
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
            let mut tables = self.tables();
            match tables.sessions.get_mut(session_id) {
                Some(session)
                    if session.is_owned_by(session_id, user_id, device_id)
                        && session.refresh_token == old_token =>
                {
                    session.refresh_token = new_token.to_string();
                    Ok(())
                }
                _ => Err(StoreError::SessionNotFound),
            }
        })
    }

    fn delete_session<'a>(
        &'a self,
        session_id: &'a SessionId,
        user_id: UserId,
        device_id: &'a DeviceId,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut tables = self.tables();
            let owned = tables
                .sessions
                .get(session_id)
                .is_some_and(|s| s.is_owned_by(session_id, user_id, device_id));
            if owned {
                tables.sessions.remove(session_id);
            }
            Ok(owned)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_for(user_id: UserId, device: &str, token: &str) -> Session {
        Session {
            id: SessionId::new(),
            user_id,
            device_id: DeviceId::new(device),
            refresh_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let store = MemoryStore::new();
        let alice = store.save_user("alice", b"h", "Alice").await.unwrap();
        let bob = store.save_user("bob", b"h", "Bob").await.unwrap();
        assert_eq!(alice, UserId::new(1));
        assert_eq!(bob, UserId::new(2));
    }

    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let store = MemoryStore::new();
        store.save_user("alice", b"h", "Alice").await.unwrap();
        assert!(matches!(
            store.save_user("alice", b"x", "Other").await,
            Err(StoreError::UserExists)
        ));
    }

    #[tokio::test]
    async fn test_lookup() {
        let store = MemoryStore::new();
        let id = store.save_user("alice", b"h", "Alice").await.unwrap();
        assert_eq!(store.user_by_login("alice").await.unwrap().id, id);
        assert_eq!(store.user_by_id(id).await.unwrap().login, "alice");
        assert!(matches!(
            store.user_by_login("bob").await,
            Err(StoreError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_rotation_is_compare_and_swap() {
        let store = MemoryStore::new();
        let user_id = store.save_user("alice", b"h", "Alice").await.unwrap();
        let session = session_for(user_id, "device-A", "r1");
        store.save_session(&session).await.unwrap();

        store
            .rotate_session(&session.device_id, user_id, &session.id, "r1", "r2")
            .await
            .unwrap();
        assert!(matches!(
            store
                .rotate_session(&session.device_id, user_id, &session.id, "r1", "r3")
                .await,
            Err(StoreError::SessionNotFound)
        ));
        assert_eq!(store.refresh_token_of(&session.id).as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_delete_respects_owner() {
        let store = MemoryStore::new();
        let alice = store.save_user("alice", b"h", "Alice").await.unwrap();
        let bob = store.save_user("bob", b"h", "Bob").await.unwrap();
        let session = session_for(alice, "device-A", "r1");
        store.save_session(&session).await.unwrap();

        assert!(!store.delete_session(&session.id, bob, &session.device_id).await.unwrap());
        assert_eq!(store.session_count(), 1);
        assert!(store.delete_session(&session.id, alice, &session.device_id).await.unwrap());
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn test_session_requires_user() {
        let store = MemoryStore::new();
        let session = session_for(UserId::new(1), "device-A", "r1");
        assert!(matches!(
            store.save_session(&session).await,
            Err(StoreError::UserNotFound)
        ));
    }
}
