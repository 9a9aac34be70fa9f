use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    bulk_delete_sports, create_sport, delete_sport, get_sport, list_sports, update_sport,
};
use crate::modules::reference_read_layers;
use crate::state::AppState;

/// Reads are open to any signed-in user; writes require a system admin
/// (enforced by the handlers' `AdminUser` extractor).
pub fn init_sports_router(state: AppState) -> Router<AppState> {
    let reads = reference_read_layers(
        Router::new()
            .route("/", get(list_sports))
            .route("/{id}", get(get_sport)),
        state,
    );

    let writes = Router::new()
        .route("/", post(create_sport))
        .route("/bulk-delete", post(bulk_delete_sports))
        .route("/{id}", put(update_sport).delete(delete_sport));

    reads.merge(writes)
}
