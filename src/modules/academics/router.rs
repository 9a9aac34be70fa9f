use axum::{
    Router,
    routing::{get, patch, post},
};

use super::controller::{
    bulk_delete_academics, create_academic, delete_academic, get_academic, list_academics,
    update_academic, update_academic_status,
};
use crate::state::AppState;

pub fn init_academics_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_academics).post(create_academic))
        .route("/bulk-delete", post(bulk_delete_academics))
        .route(
            "/{id}",
            get(get_academic)
                .put(update_academic)
                .delete(delete_academic),
        )
        .route("/{id}/status", patch(update_academic_status))
}
