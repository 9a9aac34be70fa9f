use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::{REQUEST_ID_HEADER, logging_middleware};
use crate::metrics::metrics_middleware;
use crate::middleware::onboarding::require_onboarded;
use crate::middleware::role::{require_academic, require_system_admin};
use crate::modules::academics::init_academics_router;
use crate::modules::academy::init_academy_router;
use crate::modules::amenities::init_amenities_router;
use crate::modules::athletes::init_athletes_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::bookings::init_bookings_router;
use crate::modules::cities::init_cities_router;
use crate::modules::coaches::init_coaches_router;
use crate::modules::countries::init_countries_router;
use crate::modules::dashboard::init_dashboard_router;
use crate::modules::locations::init_locations_router;
use crate::modules::onboarding::init_onboarding_router;
use crate::modules::programs::{init_packages_router, init_programs_router};
use crate::modules::promo_codes::init_promo_codes_router;
use crate::modules::sports::router::init_sports_router;
use crate::state::AppState;

/// Routes an academy admin reaches while still onboarding.
fn academy_routes() -> Router<AppState> {
    Router::new()
        .nest("/academy", init_academy_router())
        .nest("/locations", init_locations_router())
        .nest("/coaches", init_coaches_router())
        .nest("/athletes", init_athletes_router())
        .nest("/programs", init_programs_router())
        .nest("/packages", init_packages_router())
        .nest("/promo-codes", init_promo_codes_router())
        .nest("/onboarding", init_onboarding_router())
}

/// Routes that need a finished onboarding.
fn operations_routes() -> Router<AppState> {
    Router::new()
        .nest("/bookings", init_bookings_router())
        .nest("/dashboard", init_dashboard_router())
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::IF_NONE_MATCH,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([header::ETAG, HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", init_auth_router())
        .nest("/sports", init_sports_router(state.clone()))
        .nest("/amenities", init_amenities_router(state.clone()))
        .nest("/countries", init_countries_router(state.clone()))
        .nest("/cities", init_cities_router(state.clone()))
        .nest(
            "/academics",
            init_academics_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_system_admin,
            )),
        )
        .merge(
            academy_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_academic)),
        )
        .merge(
            operations_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_onboarded)),
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
}
