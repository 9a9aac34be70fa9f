use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{complete_onboarding, get_onboarding};
use crate::state::AppState;

pub fn init_onboarding_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_onboarding))
        .route("/complete", post(complete_onboarding))
}
