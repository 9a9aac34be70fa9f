use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    bulk_delete_cities, create_city, delete_city, get_city, list_cities, update_city,
};
use crate::modules::reference_read_layers;
use crate::state::AppState;

pub fn init_cities_router(state: AppState) -> Router<AppState> {
    let reads = reference_read_layers(
        Router::new()
            .route("/", get(list_cities))
            .route("/{id}", get(get_city)),
        state,
    );

    let writes = Router::new()
        .route("/", post(create_city))
        .route("/bulk-delete", post(bulk_delete_cities))
        .route("/{id}", put(update_city).delete(delete_city));

    reads.merge(writes)
}
