use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, AmenityId, reference::NameDto};

use super::model::{ReferenceFilterParams, Amenity};
use super::service::AmenityService;
use crate::middleware::auth::AdminUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/amenities",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Paginated amenities", body = Paginated<Amenity>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Amenities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_amenities(
    State(state): State<AppState>,
    Query(filters): Query<ReferenceFilterParams>,
) -> Result<Json<Paginated<Amenity>>, AppError> {
    let rows = AmenityService::list(&state.db, state.cache(), filters).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    responses(
        (status = 200, description = "Amenity", body = Amenity),
        (status = 404, description = "Amenity not found", body = ErrorResponse)
    ),
    tag = "Amenities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_amenity(
    State(state): State<AppState>,
    Path(id): Path<AmenityId>,
) -> Result<Json<Amenity>, AppError> {
    let row = AmenityService::get(&state.db, state.cache(), id).await?;
    Ok(Json(row))
}

#[utoipa::path(
    post,
    path = "/api/amenities",
    request_body = NameDto,
    responses(
        (status = 201, description = "Amenity created", body = Amenity),
        (status = 403, description = "System admin access required", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Amenities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_amenity(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<(StatusCode, Json<Amenity>), AppError> {
    let row = AmenityService::create(&state.db, state.cache(), dto).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    put,
    path = "/api/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    request_body = NameDto,
    responses(
        (status = 200, description = "Amenity updated", body = Amenity),
        (status = 404, description = "Amenity not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Amenities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_amenity(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<AmenityId>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<Json<Amenity>, AppError> {
    let row = AmenityService::update(&state.db, state.cache(), id, dto).await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/amenities/{id}",
    params(("id" = Uuid, Path, description = "Amenity ID")),
    responses(
        (status = 204, description = "Amenity deleted"),
        (status = 404, description = "Amenity not found", body = ErrorResponse)
    ),
    tag = "Amenities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_amenity(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<AmenityId>,
) -> Result<StatusCode, AppError> {
    AmenityService::delete(&state.db, state.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/amenities/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Amenities deleted", body = BulkDeleteResponse)
    ),
    tag = "Amenities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_delete_amenities(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = AmenityService::bulk_delete(&state.db, state.cache(), dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
