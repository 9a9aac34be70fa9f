use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    bulk_delete_programs, create_package, create_program, delete_package, delete_program,
    get_program, list_programs, update_package, update_program,
};
use crate::state::AppState;

pub fn init_programs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_programs).post(create_program))
        .route("/bulk-delete", post(bulk_delete_programs))
        .route(
            "/{id}",
            get(get_program).put(update_program).delete(delete_program),
        )
        .route("/{id}/packages", post(create_package))
}

pub fn init_packages_router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_package).delete(delete_package))
}
