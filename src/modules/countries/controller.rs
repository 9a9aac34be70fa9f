use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, CountryId, reference::NameDto};

use super::model::{ReferenceFilterParams, Country};
use super::service::CountryService;
use crate::middleware::auth::AdminUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/countries",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Paginated countries", body = Paginated<Country>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Countries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_countries(
    State(state): State<AppState>,
    Query(filters): Query<ReferenceFilterParams>,
) -> Result<Json<Paginated<Country>>, AppError> {
    let rows = CountryService::list(&state.db, state.cache(), filters).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/countries/{id}",
    params(("id" = Uuid, Path, description = "Country ID")),
    responses(
        (status = 200, description = "Country", body = Country),
        (status = 404, description = "Country not found", body = ErrorResponse)
    ),
    tag = "Countries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<CountryId>,
) -> Result<Json<Country>, AppError> {
    let row = CountryService::get(&state.db, state.cache(), id).await?;
    Ok(Json(row))
}

#[utoipa::path(
    post,
    path = "/api/countries",
    request_body = NameDto,
    responses(
        (status = 201, description = "Country created", body = Country),
        (status = 403, description = "System admin access required", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Countries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_country(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<(StatusCode, Json<Country>), AppError> {
    let row = CountryService::create(&state.db, state.cache(), dto).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[utoipa::path(
    put,
    path = "/api/countries/{id}",
    params(("id" = Uuid, Path, description = "Country ID")),
    request_body = NameDto,
    responses(
        (status = 200, description = "Country updated", body = Country),
        (status = 404, description = "Country not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Countries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_country(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CountryId>,
    ValidatedJson(dto): ValidatedJson<NameDto>,
) -> Result<Json<Country>, AppError> {
    let row = CountryService::update(&state.db, state.cache(), id, dto).await?;
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/api/countries/{id}",
    params(("id" = Uuid, Path, description = "Country ID")),
    responses(
        (status = 204, description = "Country deleted"),
        (status = 404, description = "Country not found", body = ErrorResponse)
    ),
    tag = "Countries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_country(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CountryId>,
) -> Result<StatusCode, AppError> {
    CountryService::delete(&state.db, state.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/countries/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Countries deleted", body = BulkDeleteResponse)
    ),
    tag = "Countries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_delete_countries(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = CountryService::bulk_delete(&state.db, state.cache(), dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
