use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tasklane_core::AppError;
use tasklane_models::{
    LoginRequest, RefreshTokenRequest, RegisterRequest, RegisterResponse, TokenPair,
};
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Error body returned by every failing call.
#[derive(ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message. Opaque for internal failures.
    pub error: String,
    /// Stable error kind, e.g. `invalid_credentials` or `session_not_found`.
    pub code: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "Login already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user_id = state
        .auth_service
        .register(&dto.login, &dto.password, &dto.name)
        .await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// Login and open a session for a device
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 404, description = "Unknown login", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state
        .auth_service
        .login(&dto.login, &dto.password, &dto.device_id)
        .await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new token pair
///
/// The presented refresh token is single use. Replaying it fails with
/// `session_not_found`; the client must log in again.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenPair),
        (status = 401, description = "Invalid, expired or already rotated refresh token", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 503, description = "Credential store unavailable, retry later", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth_service.refresh_token(&dto.refresh_token).await?;
    Ok(Json(pair))
}

/// End the caller's current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn log_out(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<StatusCode, AppError> {
    state.auth_service.log_out(&identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
