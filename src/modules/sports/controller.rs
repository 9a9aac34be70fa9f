use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, SportId};

use super::model::{CreateSportDto, ReferenceFilterParams, Sport, UpdateSportDto};
use super::service::SportService;
use crate::middleware::auth::AdminUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/sports",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name")
    ),
    responses(
        (status = 200, description = "Paginated sports", body = Paginated<Sport>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Sports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_sports(
    State(state): State<AppState>,
    Query(filters): Query<ReferenceFilterParams>,
) -> Result<Json<Paginated<Sport>>, AppError> {
    let sports = SportService::list(&state.db, state.cache(), filters).await?;
    Ok(Json(sports))
}

#[utoipa::path(
    get,
    path = "/api/sports/{id}",
    params(("id" = Uuid, Path, description = "Sport ID")),
    responses(
        (status = 200, description = "Sport", body = Sport),
        (status = 404, description = "Sport not found", body = ErrorResponse)
    ),
    tag = "Sports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_sport(
    State(state): State<AppState>,
    Path(id): Path<SportId>,
) -> Result<Json<Sport>, AppError> {
    let sport = SportService::get(&state.db, state.cache(), id).await?;
    Ok(Json(sport))
}

#[utoipa::path(
    post,
    path = "/api/sports",
    request_body = CreateSportDto,
    responses(
        (status = 201, description = "Sport created", body = Sport),
        (status = 403, description = "System admin access required", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Sports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_sport(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateSportDto>,
) -> Result<(StatusCode, Json<Sport>), AppError> {
    let sport = SportService::create(&state.db, state.cache(), dto).await?;
    Ok((StatusCode::CREATED, Json(sport)))
}

#[utoipa::path(
    put,
    path = "/api/sports/{id}",
    params(("id" = Uuid, Path, description = "Sport ID")),
    request_body = UpdateSportDto,
    responses(
        (status = 200, description = "Sport updated", body = Sport),
        (status = 404, description = "Sport not found", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse)
    ),
    tag = "Sports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_sport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<SportId>,
    ValidatedJson(dto): ValidatedJson<UpdateSportDto>,
) -> Result<Json<Sport>, AppError> {
    let sport = SportService::update(&state.db, state.cache(), id, dto).await?;
    Ok(Json(sport))
}

#[utoipa::path(
    delete,
    path = "/api/sports/{id}",
    params(("id" = Uuid, Path, description = "Sport ID")),
    responses(
        (status = 204, description = "Sport deleted"),
        (status = 404, description = "Sport not found", body = ErrorResponse),
        (status = 409, description = "Sport is used by a program", body = ErrorResponse)
    ),
    tag = "Sports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_sport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<SportId>,
) -> Result<StatusCode, AppError> {
    SportService::delete(&state.db, state.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/sports/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Sports deleted", body = BulkDeleteResponse),
        (status = 409, description = "A sport is used by a program", body = ErrorResponse)
    ),
    tag = "Sports",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_delete_sports(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = SportService::bulk_delete(&state.db, state.cache(), dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
