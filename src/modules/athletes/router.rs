use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_athletes, create_athlete, delete_athlete, get_athlete, list_athletes,
    update_athlete,
};
use crate::state::AppState;

pub fn init_athletes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_athletes).post(create_athlete))
        .route("/bulk-delete", post(bulk_delete_athletes))
        .route(
            "/{id}",
            get(get_athlete).put(update_athlete).delete(delete_athlete),
        )
}
