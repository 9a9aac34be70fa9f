use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{AcademicId, BulkDeleteDto, BulkDeleteResponse};

use super::model::{
    Academic, AcademicDetail, AcademicFilterParams, CreateAcademicDto, UpdateAcademicDto,
    UpdateAcademicStatusDto,
};
use super::service::AcademicService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/academics",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name"),
        ("status" = Option<String>, Query, description = "pending, accepted or rejected")
    ),
    responses(
        (status = 200, description = "Paginated academics", body = Paginated<Academic>),
        (status = 403, description = "System admin access required", body = ErrorResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_academics(
    State(state): State<AppState>,
    Query(filters): Query<AcademicFilterParams>,
) -> Result<Json<Paginated<Academic>>, AppError> {
    let academics = AcademicService::list(&state.db, state.cache(), filters).await?;
    Ok(Json(academics))
}

#[utoipa::path(
    get,
    path = "/api/academics/{id}",
    params(("id" = Uuid, Path, description = "Academic ID")),
    responses(
        (status = 200, description = "Academic with sports and counts", body = AcademicDetail),
        (status = 404, description = "Academic not found", body = ErrorResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_academic(
    State(state): State<AppState>,
    Path(id): Path<AcademicId>,
) -> Result<Json<AcademicDetail>, AppError> {
    let academic = AcademicService::get(&state.db, state.cache(), id).await?;
    Ok(Json(academic))
}

#[utoipa::path(
    post,
    path = "/api/academics",
    request_body = CreateAcademicDto,
    responses(
        (status = 201, description = "Academic and its admin account created", body = AcademicDetail),
        (status = 409, description = "Admin email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_academic(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAcademicDto>,
) -> Result<(StatusCode, Json<AcademicDetail>), AppError> {
    let academic = AcademicService::create(&state.db, state.cache(), dto).await?;
    Ok((StatusCode::CREATED, Json(academic)))
}

#[utoipa::path(
    put,
    path = "/api/academics/{id}",
    params(("id" = Uuid, Path, description = "Academic ID")),
    request_body = UpdateAcademicDto,
    responses(
        (status = 200, description = "Academic updated", body = AcademicDetail),
        (status = 404, description = "Academic not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_academic(
    State(state): State<AppState>,
    Path(id): Path<AcademicId>,
    ValidatedJson(dto): ValidatedJson<UpdateAcademicDto>,
) -> Result<Json<AcademicDetail>, AppError> {
    let academic = AcademicService::update(&state.db, state.cache(), id, dto).await?;
    Ok(Json(academic))
}

#[utoipa::path(
    patch,
    path = "/api/academics/{id}/status",
    params(("id" = Uuid, Path, description = "Academic ID")),
    request_body = UpdateAcademicStatusDto,
    responses(
        (status = 200, description = "Status changed", body = Academic),
        (status = 404, description = "Academic not found", body = ErrorResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_academic_status(
    State(state): State<AppState>,
    Path(id): Path<AcademicId>,
    ValidatedJson(dto): ValidatedJson<UpdateAcademicStatusDto>,
) -> Result<Json<Academic>, AppError> {
    let academic =
        AcademicService::update_status(&state.db, state.cache(), id, dto.status).await?;
    Ok(Json(academic))
}

#[utoipa::path(
    delete,
    path = "/api/academics/{id}",
    params(("id" = Uuid, Path, description = "Academic ID")),
    responses(
        (status = 204, description = "Academic deleted"),
        (status = 404, description = "Academic not found", body = ErrorResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_academic(
    State(state): State<AppState>,
    Path(id): Path<AcademicId>,
) -> Result<StatusCode, AppError> {
    AcademicService::delete(&state.db, state.cache(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/academics/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Academics deleted", body = BulkDeleteResponse)
    ),
    tag = "Academics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn bulk_delete_academics(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = AcademicService::bulk_delete(&state.db, state.cache(), dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
