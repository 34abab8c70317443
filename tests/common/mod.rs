use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tasklane::router::init_router;
use tasklane::state::{AppConfig, AppState};
use tasklane::tasklane_config::{
    CorsConfig, DatabaseConfig, InterceptorConfig, JwtConfig, ServerConfig,
};
use tasklane::tasklane_db::{SqliteStore, init_memory_pool};
use tower::ServiceExt;

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt: JwtConfig {
            access_secret: "test-access-secret-for-integration-tests".to_string(),
            refresh_secret: "test-refresh-secret-for-integration-tests".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 2_592_000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            store_timeout: Duration::from_secs(3),
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout: Duration::from_secs(30),
            bcrypt_cost: 4,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        interceptor: InterceptorConfig::default(),
    }
}

/// App over a fresh in-memory database.
pub async fn setup_test_app() -> Router {
    setup_test_app_with(test_config()).await
}

pub async fn setup_test_app_with(config: AppConfig) -> Router {
    let pool = init_memory_pool().await.unwrap();
    let state = AppState::new(Arc::new(SqliteStore::new(pool)), &config);
    init_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: Value,
    access_token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = access_token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

#[allow(dead_code)]
pub async fn get_with_header(
    app: &Router,
    uri: &str,
    authorization: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::ACCEPT, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

#[allow(dead_code)]
pub async fn get_authorized(app: &Router, uri: &str, access_token: &str) -> (StatusCode, Value) {
    get_with_header(app, uri, Some(&format!("Bearer {}", access_token))).await
}

pub async fn register(app: &Router, login: &str, password: &str, name: &str) -> i64 {
    let (status, body) = post_json(
        app,
        "/api/auth/register",
        json!({ "login": login, "password": password, "name": name }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["user_id"].as_i64().unwrap()
}

/// Logs in and returns `(access_token, refresh_token)`.
pub async fn login(app: &Router, login: &str, password: &str, device_id: &str) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/api/auth/login",
        json!({ "login": login, "password": password, "device_id": device_id }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[allow(dead_code)]
pub async fn refresh(app: &Router, access_token: &str, refresh_token: &str) -> (StatusCode, Value) {
    post_json(
        app,
        "/api/auth/refresh",
        json!({ "refresh_token": refresh_token }),
        Some(access_token),
    )
    .await
}
