use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, CityId};

use super::model::{City, CityFilterParams, CreateCityDto, UpdateCityDto};
use super::service::CityService;
use crate::middleware::auth::AdminUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/cities",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name"),
        ("country_id" = Option<Uuid>, Query, description = "Only cities in this country")
    ),
    responses(
        (status = 200, description = "Paginated cities", body = Paginated<City>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Cities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_cities(
    State(state): State<AppState>,
    Query(filters): Query<CityFilterParams>,
) -> Result<Json<Paginated<City>>, AppError> {
    let rows = CityService::list(&state.db, state.cache(), filters).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/cities/{id}",
    params(("id" = Uuid, Path, description = "City ID")),
    responses(
        (status = 200, description = "City", body = City),
        (status = 404, description = "City not found", body = ErrorResponse)
    ),
    tag = "Cities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<CityId>,
) -> Result<Json<City>, AppError> {
    let row = CityService::get(&state.db, state.cache(), id).await?;
    Ok(Json(row))
}

#[utoipa::path(
    post,
    path = "/api/cities",
    request_body = CreateCityDto,
    responses(
        (status = 201, description = "City created", body = City),
        (status = 403, description = "System admin access required", body = ErrorResponse),
        (status = 409, description = "Name already taken in this country", body = ErrorResponse),
        (status = 422, description = "Validation error or unknown country", body = ErrorResponse)
    ),
    tag = "Cities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_city(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateCityDto>,
) -> Result<(StatusCode, Json<City>), AppError> {
    let row = CityService::create(&state.db, state.cache(), dto).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    put,
    path = "/api/cities/{id}",
    params(("id" = Uuid, Path, description = "City ID")),
    request_body = UpdateCityDto,
    responses(
        (status = 200, description = "City updated", body = City),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Cities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_city(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CityId>,
    ValidatedJson(dto): ValidatedJson<UpdateCityDto>,
) -> Result<Json<City>, AppError> {
    let row = CityService::update(&state.db, state.cache(), id, dto).await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/cities/{id}",
    params(("id" = Uuid, Path, description = "City ID")),
    responses(
        (status = 204, description = "City deleted"),
        (status = 404, description = "City not found", body = ErrorResponse)
    ),
    tag = "Cities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_city(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CityId>,
) -> Result<StatusCode, AppError> {
    CityService::delete(&state.db, state.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/cities/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Cities deleted", body = BulkDeleteResponse)
    ),
    tag = "Cities",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_delete_cities(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = CityService::bulk_delete(&state.db, state.cache(), dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
