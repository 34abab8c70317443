//! User models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tasklane_core::UserId;
use utoipa::ToSchema;

/// A user row as stored in the credential store.
///
/// The password hash is opaque bytes; it is never serialized and never
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct User {
    #[sqlx(try_from = "i64")]
    pub id: UserId,
    pub login: String,
    pub name: String,
    #[sqlx(rename = "hash_password")]
    pub password_hash: Vec<u8>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Public view of a user returned by the GetUser method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: UserId,
    #[schema(example = "alice")]
    pub login: String,
    #[schema(example = "Alice")]
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            login: user.login,
            name: user.name,
        }
    }
}
