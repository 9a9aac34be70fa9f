use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_coaches, create_coach, delete_coach, get_coach, list_coaches,
    update_coach,
};
use crate::state::AppState;

pub fn init_coaches_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coaches).post(create_coach))
        .route("/bulk-delete", post(bulk_delete_coaches))
        .route(
            "/{id}",
            get(get_coach).put(update_coach).delete(delete_coach),
        )
}
