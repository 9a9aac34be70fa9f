use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{login, me, refresh};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
}
