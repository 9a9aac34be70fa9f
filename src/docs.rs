use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use academix_core::{ErrorResponse, PaginationMeta};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, MessageResponse};

/// Schemas used in request and response bodies are collected from the paths.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::me,
        crate::modules::sports::controller::list_sports,
        crate::modules::sports::controller::get_sport,
        crate::modules::sports::controller::create_sport,
        crate::modules::sports::controller::update_sport,
        crate::modules::sports::controller::delete_sport,
        crate::modules::sports::controller::bulk_delete_sports,
        crate::modules::amenities::controller::list_amenities,
        crate::modules::amenities::controller::get_amenity,
        crate::modules::amenities::controller::create_amenity,
        crate::modules::amenities::controller::update_amenity,
        crate::modules::amenities::controller::delete_amenity,
        crate::modules::amenities::controller::bulk_delete_amenities,
        crate::modules::countries::controller::list_countries,
        crate::modules::countries::controller::get_country,
        crate::modules::countries::controller::create_country,
        crate::modules::countries::controller::update_country,
        crate::modules::countries::controller::delete_country,
        crate::modules::countries::controller::bulk_delete_countries,
        crate::modules::cities::controller::list_cities,
        crate::modules::cities::controller::get_city,
        crate::modules::cities::controller::create_city,
        crate::modules::cities::controller::update_city,
        crate::modules::cities::controller::delete_city,
        crate::modules::cities::controller::bulk_delete_cities,
        crate::modules::academics::controller::list_academics,
        crate::modules::academics::controller::get_academic,
        crate::modules::academics::controller::create_academic,
        crate::modules::academics::controller::update_academic,
        crate::modules::academics::controller::update_academic_status,
        crate::modules::academics::controller::delete_academic,
        crate::modules::academics::controller::bulk_delete_academics,
        crate::modules::academy::controller::get_academy,
        crate::modules::academy::controller::update_academy,
        crate::modules::locations::controller::list_locations,
        crate::modules::locations::controller::get_location,
        crate::modules::locations::controller::create_location,
        crate::modules::locations::controller::update_location,
        crate::modules::locations::controller::delete_location,
        crate::modules::locations::controller::bulk_delete_locations,
        crate::modules::coaches::controller::list_coaches,
        crate::modules::coaches::controller::get_coach,
        crate::modules::coaches::controller::create_coach,
        crate::modules::coaches::controller::update_coach,
        crate::modules::coaches::controller::delete_coach,
        crate::modules::coaches::controller::bulk_delete_coaches,
        crate::modules::athletes::controller::list_athletes,
        crate::modules::athletes::controller::get_athlete,
        crate::modules::athletes::controller::create_athlete,
        crate::modules::athletes::controller::update_athlete,
        crate::modules::athletes::controller::delete_athlete,
        crate::modules::athletes::controller::bulk_delete_athletes,
        crate::modules::programs::controller::list_programs,
        crate::modules::programs::controller::get_program,
        crate::modules::programs::controller::create_program,
        crate::modules::programs::controller::update_program,
        crate::modules::programs::controller::delete_program,
        crate::modules::programs::controller::bulk_delete_programs,
        crate::modules::programs::controller::create_package,
        crate::modules::programs::controller::update_package,
        crate::modules::programs::controller::delete_package,
        crate::modules::promo_codes::controller::list_promo_codes,
        crate::modules::promo_codes::controller::get_promo_code,
        crate::modules::promo_codes::controller::create_promo_code,
        crate::modules::promo_codes::controller::update_promo_code,
        crate::modules::promo_codes::controller::delete_promo_code,
        crate::modules::promo_codes::controller::bulk_delete_promo_codes,
        crate::modules::promo_codes::controller::generate_promo_code,
        crate::modules::bookings::controller::list_bookings,
        crate::modules::bookings::controller::booking_calendar,
        crate::modules::bookings::controller::get_booking,
        crate::modules::bookings::controller::create_booking,
        crate::modules::bookings::controller::update_booking_status,
        crate::modules::dashboard::controller::get_dashboard,
        crate::modules::onboarding::controller::get_onboarding,
        crate::modules::onboarding::controller::complete_onboarding,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            BulkDeleteDto,
            BulkDeleteResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and the current user"),
        (name = "Sports", description = "Sports offered across the platform"),
        (name = "Amenities", description = "Facilities a location may offer"),
        (name = "Countries", description = "Country reference data"),
        (name = "Cities", description = "City reference data"),
        (name = "Academics", description = "Tenant management for system admins"),
        (name = "Academy", description = "The signed-in academy's own profile"),
        (name = "Locations", description = "Training venues"),
        (name = "Coaches", description = "Academy coaches"),
        (name = "Athletes", description = "Registered athletes"),
        (name = "Programs", description = "Training programs"),
        (name = "Packages", description = "Priced packages and weekly schedules"),
        (name = "Promo codes", description = "Discount codes"),
        (name = "Bookings", description = "Athlete bookings and the calendar"),
        (name = "Dashboard", description = "Booking and revenue reporting"),
        (name = "Onboarding", description = "Academy setup wizard")
    ),
    info(
        title = "Academix API",
        version = "0.1.0",
        description = "Multi-tenant management API for sports academies, built with Rust, Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_tenant_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/academics/{id}/status",
            "/api/programs/{id}/packages",
            "/api/bookings/calendar",
            "/api/onboarding/complete",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
