use std::sync::Arc;
use std::time::Duration;

use tasklane_auth::{AuthIdentity, TokenCodec, TokenKind, TokenPair};
use tasklane_core::{
    AuthError, DeviceId, UserId, check_password_length, hash_password_with_cost, verify_password,
};
use tasklane_db::{SessionStore, UserProvider, UserSaver};
use tasklane_models::User;
use tracing::{info, instrument, warn};

use super::session::{SessionManager, with_deadline};
use crate::metrics::{
    track_login_failure, track_login_success, track_refresh, track_registration,
    track_tokens_issued,
};

/// Tunables shared by every auth operation.
#[derive(Clone, Copy, Debug)]
pub struct AuthOptions {
    /// Deadline applied to each credential store call.
    pub store_timeout: Duration,
    pub bcrypt_cost: u32,
}

/// Orchestrates the credential store, the token codec and the session
/// manager to implement Register, Login, RefreshToken, LogOut and FetchUser.
pub struct AuthService {
    users: Arc<dyn UserProvider>,
    saver: Arc<dyn UserSaver>,
    sessions: SessionManager,
    codec: Arc<TokenCodec>,
    options: AuthOptions,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("sessions", &self.sessions)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::validation(format!("{field} is required")));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserProvider>,
        saver: Arc<dyn UserSaver>,
        sessions: SessionManager,
        codec: Arc<TokenCodec>,
        options: AuthOptions,
    ) -> Self {
        Self {
            users,
            saver,
            sessions,
            codec,
            options,
        }
    }

    /// Builds a service whose three store capabilities come from one backend.
    pub fn from_store<S>(store: Arc<S>, codec: Arc<TokenCodec>, options: AuthOptions) -> Self
    where
        S: UserSaver + UserProvider + SessionStore + 'static,
    {
        let sessions = SessionManager::new(store.clone(), options.store_timeout);
        Self::new(store.clone(), store, sessions, codec, options)
    }

    /// Registers a user and returns the id the store assigned.
    ///
    /// The password is hashed with bcrypt before it reaches the store; the
    /// plaintext is never persisted or logged.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        login: &str,
        password: &str,
        name: &str,
    ) -> Result<UserId, AuthError> {
        require("login", login)?;
        require("password", password)?;
        check_password_length(password)?;
        require("name", name)?;

        let password = password.to_string();
        let cost = self.options.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(AuthError::internal)??;

        let user_id = with_deadline(
            "save_user",
            self.options.store_timeout,
            self.saver.save_user(login, hash.as_bytes(), name),
        )
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::UserExists) {
                warn!(login, "Registration rejected, login taken");
            }
        })?;

        track_registration();
        info!(user_id = %user_id, "User registered");
        Ok(user_id)
    }

    /// Verifies credentials, opens a session for `device_id` and returns its
    /// token pair.
    ///
    /// Tokens are only returned once the session row is persisted.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        login: &str,
        password: &str,
        device_id: &str,
    ) -> Result<TokenPair, AuthError> {
        require("login", login)?;
        require("password", password)?;
        check_password_length(password)?;
        require("device_id", device_id)?;

        let user = match with_deadline(
            "get_user_by_login",
            self.options.store_timeout,
            self.users.user_by_login(login),
        )
        .await
        {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => {
                track_login_failure("user_not_found");
                warn!(security.event = "login_failed", login, "Unknown login");
                return Err(AuthError::UserNotFound);
            }
            Err(e) => return Err(e),
        };

        if !self.password_matches(password, &user).await? {
            track_login_failure("invalid_credentials");
            warn!(
                security.event = "login_failed",
                user_id = %user.id,
                "Password mismatch"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let identity = AuthIdentity::new(
            user.id,
            self.sessions.generate_id(),
            DeviceId::new(device_id),
        );
        let pair = self.codec.issue_pair(&identity)?;

        self.sessions
            .create(
                identity.session_id,
                identity.user_id,
                &identity.device_id,
                &pair.refresh_token,
            )
            .await?;

        track_login_success();
        track_tokens_issued(TokenKind::Access);
        track_tokens_issued(TokenKind::Refresh);
        info!(
            user_id = %identity.user_id,
            session_id = %identity.session_id,
            device_id = %identity.device_id,
            "User logged in"
        );
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair bound to the same session and
    /// device, rotating the session's stored refresh token.
    ///
    /// A refresh token that was already rotated fails with
    /// [`AuthError::SessionNotFound`]. Clients should treat that as a forced
    /// re-login; retrying with the same token can never succeed.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        require("refresh_token", refresh_token)?;

        let identity = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                track_refresh("invalid");
                AuthError::from(e)
            })?;
        let pair = self.codec.issue_pair(&identity)?;

        match self
            .sessions
            .rotate(&identity, refresh_token, &pair.refresh_token)
            .await
        {
            Ok(()) => {}
            Err(AuthError::SessionNotFound) => {
                track_refresh("stale");
                warn!(
                    security.event = "refresh_replay",
                    user_id = %identity.user_id,
                    session_id = %identity.session_id,
                    device_id = %identity.device_id,
                    "Stale or revoked refresh token presented"
                );
                return Err(AuthError::SessionNotFound);
            }
            Err(e) => return Err(e),
        }

        track_refresh("success");
        track_tokens_issued(TokenKind::Access);
        track_tokens_issued(TokenKind::Refresh);
        Ok(pair)
    }

    /// Ends the session named by `identity`.
    ///
    /// `identity` must come from a verified access token, never from request
    /// fields.
    #[instrument(skip(self))]
    pub async fn log_out(&self, identity: &AuthIdentity) -> Result<(), AuthError> {
        self.sessions.delete(identity).await?;
        info!(
            user_id = %identity.user_id,
            session_id = %identity.session_id,
            "User logged out"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn fetch_user(&self, user_id: UserId) -> Result<User, AuthError> {
        if user_id.get() <= 0 {
            return Err(AuthError::validation("user_id must be positive"));
        }

        with_deadline(
            "get_user_by_id",
            self.options.store_timeout,
            self.users.user_by_id(user_id),
        )
        .await
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    async fn password_matches(&self, password: &str, user: &User) -> Result<bool, AuthError> {
        let hash = String::from_utf8(user.password_hash.clone()).map_err(AuthError::internal)?;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(AuthError::internal)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane_config::JwtConfig;
    use tasklane_db::MemoryStore;

    fn options() -> AuthOptions {
        AuthOptions {
            store_timeout: Duration::from_secs(1),
            bcrypt_cost: 4,
        }
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(&JwtConfig {
            access_secret: "access-secret-key-at-least-32-characters".to_string(),
            refresh_secret: "refresh-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 2_592_000,
        }))
    }

    fn setup() -> (Arc<MemoryStore>, AuthService) {
        let store = Arc::new(MemoryStore::new());
        let service = AuthService::from_store(store.clone(), codec(), options());
        (store, service)
    }

    fn identity_of(service: &AuthService, access_token: &str) -> AuthIdentity {
        service
            .codec()
            .verify(access_token, TokenKind::Access)
            .unwrap()
    }

    async fn registered() -> (Arc<MemoryStore>, AuthService, UserId) {
        let (store, service) = setup();
        let user_id = service.register("alice", "pw123", "Alice").await.unwrap();
        (store, service, user_id)
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (store, service, user_id) = registered().await;
        assert_eq!(user_id, UserId::new(1));

        let pair = service.login("alice", "pw123", "device-A").await.unwrap();
        let identity = identity_of(&service, &pair.access_token);
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.device_id, DeviceId::new("device-A"));
        assert_eq!(
            store.refresh_token_of(&identity.session_id).as_deref(),
            Some(pair.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let (store, _, user_id) = registered().await;
        let user = store.user_by_id(user_id).await.unwrap();
        let hash = String::from_utf8(user.password_hash).unwrap();
        assert_ne!(hash, "pw123");
        assert!(hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_login_conflicts() {
        let (_, service, _) = registered().await;
        let err = service
            .register("alice", "different", "Somebody Else")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let (_, service) = setup();
        for (login, password, name) in [("", "pw", "n"), ("l", "", "n"), ("l", "pw", " ")] {
            let err = service.register(login, password, name).await.unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password_creates_no_session() {
        let (store, service, _) = registered().await;
        let err = service.login("alice", "wrong", "device-A").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn test_multibyte_password_sharing_72_byte_prefix_is_rejected() {
        let (store, service) = setup();
        // 40 chars, 80 bytes
        let err = service
            .register("alice", &"é".repeat(40), "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        service
            .register("alice", &"é".repeat(36), "Alice")
            .await
            .unwrap();
        let err = service
            .login("alice", &format!("{}zzzz", "é".repeat(36)), "device-A")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(store.session_count(), 0);

        assert!(
            service
                .login("alice", &"é".repeat(36), "device-A")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (store, service) = setup();
        let err = service.login("ghost", "pw123", "device-A").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_rotation_scenario() {
        let (_, service, _) = registered().await;
        let first = service.login("alice", "pw123", "device-A").await.unwrap();

        let second = service.refresh_token(&first.refresh_token).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);

        let replay = service.refresh_token(&first.refresh_token).await.unwrap_err();
        assert!(matches!(replay, AuthError::SessionNotFound));

        let third = service.refresh_token(&second.refresh_token).await.unwrap();
        assert_ne!(third.refresh_token, second.refresh_token);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_has_one_winner() {
        let (_, service, _) = registered().await;
        let pair = service.login("alice", "pw123", "device-A").await.unwrap();

        let (a, b) = tokio::join!(
            service.refresh_token(&pair.refresh_token),
            service.refresh_token(&pair.refresh_token),
        );
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(AuthError::SessionNotFound)))
        );
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let (_, service, _) = registered().await;
        let pair = service.login("alice", "pw123", "device-A").await.unwrap();

        let err = service.refresh_token(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn test_refresh_with_expired_token() {
        let (store, service, _) = registered().await;
        let pair = service.login("alice", "pw123", "device-A").await.unwrap();
        let identity = identity_of(&service, &pair.access_token);

        let issued = chrono::Utc::now().timestamp() - 3_600;
        let expired = service
            .codec()
            .issue_at(TokenKind::Refresh, &identity, Duration::from_secs(60), issued)
            .unwrap();

        let err = service.refresh_token(&expired).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
        assert_eq!(
            store.refresh_token_of(&identity.session_id).as_deref(),
            Some(pair.refresh_token.as_str())
        );
    }

    #[tokio::test]
    async fn test_logout_then_refresh_fails() {
        let (store, service, _) = registered().await;
        let pair = service.login("alice", "pw123", "device-A").await.unwrap();
        let identity = identity_of(&service, &pair.access_token);

        service.log_out(&identity).await.unwrap();
        assert_eq!(store.session_count(), 0);

        let err = service.refresh_token(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_devices_are_isolated() {
        let (_, service, _) = registered().await;
        let phone = service.login("alice", "pw123", "device-A").await.unwrap();
        let laptop = service.login("alice", "pw123", "device-B").await.unwrap();

        let phone_identity = identity_of(&service, &phone.access_token);
        service.log_out(&phone_identity).await.unwrap();

        assert!(service.refresh_token(&phone.refresh_token).await.is_err());
        assert!(service.refresh_token(&laptop.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_user() {
        let (_, service, user_id) = registered().await;
        let user = service.fetch_user(user_id).await.unwrap();
        assert_eq!(user.login, "alice");
        assert_eq!(user.name, "Alice");

        let err = service.fetch_user(UserId::new(99)).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));

        let err = service.fetch_user(UserId::new(0)).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
