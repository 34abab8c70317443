use axum::{Router, routing::post};
use tasklane_core::methods;

use super::controller::{log_out, login_user, refresh_token, register_user};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route(methods::REGISTER, post(register_user))
        .route(methods::LOGIN, post(login_user))
        .route(methods::REFRESH_TOKEN, post(refresh_token))
        .route(methods::LOG_OUT, post(log_out))
}
