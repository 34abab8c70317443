use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use tasklane_auth::TokenCodec;
use tasklane_config::{
    ConfigError, CorsConfig, DatabaseConfig, InterceptorConfig, JwtConfig, ServerConfig,
};
use tasklane_db::{SessionStore, SqliteStore, UserProvider, UserSaver, init_db_pool, run_migrations};
use tracing::info;

use crate::modules::auth::service::{AuthOptions, AuthService};

/// Every configuration section, loaded once at start-up.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub interceptor: InterceptorConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt: JwtConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            cors: CorsConfig::from_env(),
            interceptor: InterceptorConfig::from_env(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub token_codec: Arc<TokenCodec>,
    pub interceptor_config: Arc<InterceptorConfig>,
    pub cors_config: CorsConfig,
    pub request_timeout: Duration,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("interceptor_config", &self.interceptor_config)
            .field("cors_config", &self.cors_config)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the auth stack over `store`.
    pub fn new<S>(store: Arc<S>, config: &AppConfig) -> Self
    where
        S: UserSaver + UserProvider + SessionStore + 'static,
    {
        let token_codec = Arc::new(TokenCodec::new(&config.jwt));
        let options = AuthOptions {
            store_timeout: config.database.store_timeout,
            bcrypt_cost: config.server.bcrypt_cost,
        };

        Self {
            auth_service: Arc::new(AuthService::from_store(store, token_codec.clone(), options)),
            token_codec,
            interceptor_config: Arc::new(config.interceptor.clone()),
            cors_config: config.cors.clone(),
            request_timeout: config.server.request_timeout,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics_handle = handle;
        self
    }
}

/// Opens the SQLite store, applies migrations and builds the state.
pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = init_db_pool(&config.database).await?;
    run_migrations(&pool).await?;
    info!(url = %config.database.url, "Credential store ready");

    Ok(AppState::new(Arc::new(SqliteStore::new(pool)), config))
}
