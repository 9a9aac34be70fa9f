use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, CoachId};

use super::model::{CreateCoachDto, CoachDetail, CoachFilterParams, UpdateCoachDto};
use super::service::CoachService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/coaches",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name"),
        ("sport_id" = Option<Uuid>, Query, description = "Only coaches teaching this sport")
    ),
    responses(
        (status = 200, description = "Paginated coaches", body = Paginated<CoachDetail>),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Coaches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn list_coaches(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(filters): Query<CoachFilterParams>,
) -> Result<Json<Paginated<CoachDetail>>, AppError> {
    let coaches =
        CoachService::list(&state.db, state.cache(), user.academic_id, filters).await?;
    Ok(Json(coaches))
}

#[utoipa::path(
    get,
    path = "/api/coaches/{id}",
    params(("id" = Uuid, Path, description = "Coach ID")),
    responses(
        (status = 200, description = "Coach with its sports", body = CoachDetail),
        (status = 404, description = "Coach not found", body = ErrorResponse)
    ),
    tag = "Coaches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_coach(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<CoachId>,
) -> Result<Json<CoachDetail>, AppError> {
    let coach = CoachService::get(&state.db, user.academic_id, id).await?;
    Ok(Json(coach))
}

#[utoipa::path(
    post,
    path = "/api/coaches",
    request_body = CreateCoachDto,
    responses(
        (status = 201, description = "Coach created", body = CoachDetail),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Coaches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_coach(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<CreateCoachDto>,
) -> Result<(StatusCode, Json<CoachDetail>), AppError> {
    let coach =
        CoachService::create(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok((StatusCode::CREATED, Json(coach)))
}

#[utoipa::path(
    put,
    path = "/api/coaches/{id}",
    params(("id" = Uuid, Path, description = "Coach ID")),
    request_body = UpdateCoachDto,
    responses(
        (status = 200, description = "Coach updated", body = CoachDetail),
        (status = 404, description = "Coach not found", body = ErrorResponse)
    ),
    tag = "Coaches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_coach(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<CoachId>,
    ValidatedJson(dto): ValidatedJson<UpdateCoachDto>,
) -> Result<Json<CoachDetail>, AppError> {
    let coach =
        CoachService::update(&state.db, state.cache(), user.academic_id, id, dto).await?;
    Ok(Json(coach))
}

#[utoipa::path(
    delete,
    path = "/api/coaches/{id}",
    params(("id" = Uuid, Path, description = "Coach ID")),
    responses(
        (status = 204, description = "Coach deleted"),
        (status = 404, description = "Coach not found", body = ErrorResponse)
    ),
    tag = "Coaches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn delete_coach(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<CoachId>,
) -> Result<StatusCode, AppError> {
    CoachService::delete(&state.db, state.cache(), user.academic_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/coaches/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Coaches deleted", body = BulkDeleteResponse)
    ),
    tag = "Coaches",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn bulk_delete_coaches(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted =
        CoachService::bulk_delete(&state.db, state.cache(), user.academic_id, dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
