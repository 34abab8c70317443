//! Session model.

use tasklane_core::{DeviceId, SessionId, UserId};

/// A session row: binds a user and a device to the one refresh token that is
/// currently valid for it.
///
/// The composite identity is `(user_id, device_id, id)`. `refresh_token` is
/// replaced atomically on every rotation.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub device_id: DeviceId,
    pub refresh_token: String,
}

impl Session {
    /// True when `(user_id, device_id, id)` all match.
    pub fn is_owned_by(&self, id: &SessionId, user_id: UserId, device_id: &DeviceId) -> bool {
        self.id == *id && self.user_id == user_id && self.device_id == *device_id
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}
