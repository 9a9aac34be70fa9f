use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    bulk_delete_amenities, create_amenity, delete_amenity, get_amenity, list_amenities, update_amenity,
};
use crate::modules::reference_read_layers;
use crate::state::AppState;

pub fn init_amenities_router(state: AppState) -> Router<AppState> {
    let reads = reference_read_layers(
        Router::new()
            .route("/", get(list_amenities))
            .route("/{id}", get(get_amenity)),
        state,
    );

    let writes = Router::new()
        .route("/", post(create_amenity))
        .route("/bulk-delete", post(bulk_delete_amenities))
        .route("/{id}", put(update_amenity).delete(delete_amenity));

    reads.merge(writes)
}
