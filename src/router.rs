use crate::docs::ApiDoc;
use crate::logging::{REQUEST_ID_HEADER, logging_middleware};
use crate::metrics::{metrics_app, metrics_middleware};
use crate::middleware::auth::auth_interceptor;
use crate::modules::auth::router::init_auth_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// RPC methods. Every route here sits behind the interceptor.
///
/// Routes carry their full paths so the matched template is the method name
/// the interceptor config refers to.
pub fn init_rpc_router(state: &AppState) -> Router<AppState> {
    init_auth_router()
        .merge(init_users_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_interceptor))
}

pub fn init_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(init_rpc_router(&state));

    if let Some(handle) = state.metrics_handle.clone() {
        router = router.merge(metrics_app(handle));
    }

    router
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    REQUEST_ID_HEADER.clone(),
                ])
                .expose_headers([REQUEST_ID_HEADER.clone()])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
