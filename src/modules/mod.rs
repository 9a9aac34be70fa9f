pub mod academics;
pub mod academy;
pub mod amenities;
pub mod athletes;
pub mod auth;
pub mod bookings;
pub mod cities;
pub mod coaches;
pub mod countries;
pub mod dashboard;
pub mod locations;
pub mod onboarding;
pub mod programs;
pub mod promo_codes;
pub mod sports;

use axum::{Router, middleware};

use academix_cache::{CacheControlConfig, cache_control, etag_middleware};

use crate::middleware::role::require_auth;
use crate::state::AppState;

/// Read routes of the reference tables: any signed-in user, with
/// client-side caching and conditional GETs.
pub(crate) fn reference_read_layers(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router
        .route_layer(cache_control(
            CacheControlConfig::private(300).with_stale_while_revalidate(60),
        ))
        .route_layer(middleware::from_fn(etag_middleware))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
