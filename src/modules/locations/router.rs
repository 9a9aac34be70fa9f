use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_locations, create_location, delete_location, get_location, list_locations,
    update_location,
};
use crate::state::AppState;

pub fn init_locations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/bulk-delete", post(bulk_delete_locations))
        .route(
            "/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
}
