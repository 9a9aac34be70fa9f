use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    bulk_delete_countries, create_country, delete_country, get_country, list_countries, update_country,
};
use crate::modules::reference_read_layers;
use crate::state::AppState;

pub fn init_countries_router(state: AppState) -> Router<AppState> {
    let reads = reference_read_layers(
        Router::new()
            .route("/", get(list_countries))
            .route("/{id}", get(get_country)),
        state,
    );

    let writes = Router::new()
        .route("/", post(create_country))
        .route("/bulk-delete", post(bulk_delete_countries))
        .route("/{id}", put(update_country).delete(delete_country));

    reads.merge(writes)
}
