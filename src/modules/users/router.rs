use axum::{Router, routing::get};
use tasklane_core::methods;

use super::controller::{get_me, get_user};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route(methods::GET_ME, get(get_me))
        .route(methods::GET_USER, get(get_user))
}
