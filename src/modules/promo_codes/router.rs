use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_promo_codes, create_promo_code, delete_promo_code, generate_promo_code,
    get_promo_code, list_promo_codes, update_promo_code,
};
use crate::state::AppState;

pub fn init_promo_codes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promo_codes).post(create_promo_code))
        .route("/generate", post(generate_promo_code))
        .route("/bulk-delete", post(bulk_delete_promo_codes))
        .route(
            "/{id}",
            get(get_promo_code)
                .put(update_promo_code)
                .delete(delete_promo_code),
        )
}
