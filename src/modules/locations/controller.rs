use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, LocationId};

use super::model::{CreateLocationDto, LocationDetail, LocationFilterParams, UpdateLocationDto};
use super::service::LocationService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/locations",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Paginated locations", body = Paginated<LocationDetail>),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn list_locations(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(filters): Query<LocationFilterParams>,
) -> Result<Json<Paginated<LocationDetail>>, AppError> {
    let locations =
        LocationService::list(&state.db, state.cache(), user.academic_id, filters).await?;
    Ok(Json(locations))
}

#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location with its sports and amenities", body = LocationDetail),
        (status = 404, description = "Location not found", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_location(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<LocationId>,
) -> Result<Json<LocationDetail>, AppError> {
    let location = LocationService::get(&state.db, user.academic_id, id).await?;
    Ok(Json(location))
}

#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationDto,
    responses(
        (status = 201, description = "Location created", body = LocationDetail),
        (status = 409, description = "Name already used by another location", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_location(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<CreateLocationDto>,
) -> Result<(StatusCode, Json<LocationDetail>), AppError> {
    let location =
        LocationService::create(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    request_body = UpdateLocationDto,
    responses(
        (status = 200, description = "Location updated", body = LocationDetail),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 409, description = "Name already used by another location", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_location(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<LocationId>,
    ValidatedJson(dto): ValidatedJson<UpdateLocationDto>,
) -> Result<Json<LocationDetail>, AppError> {
    let location =
        LocationService::update(&state.db, state.cache(), user.academic_id, id, dto).await?;
    Ok(Json(location))
}

#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found", body = ErrorResponse),
        (status = 409, description = "Location still has programs", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn delete_location(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<LocationId>,
) -> Result<StatusCode, AppError> {
    LocationService::delete(&state.db, state.cache(), user.academic_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/locations/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Locations deleted", body = BulkDeleteResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn bulk_delete_locations(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted =
        LocationService::bulk_delete(&state.db, state.cache(), user.academic_id, dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
