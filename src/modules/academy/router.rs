use axum::{Router, routing::get};

use super::controller::{get_academy, update_academy};
use crate::state::AppState;

pub fn init_academy_router() -> Router<AppState> {
    Router::new().route("/", get(get_academy).put(update_academy))
}
