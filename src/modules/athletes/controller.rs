use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, AthleteId};

use super::model::{CreateAthleteDto, AthleteWithBookings, AthleteFilterParams, UpdateAthleteDto};
use super::service::AthleteService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/athletes",
    params(
        PaginationParams,
        ("search" = Option<String>, Query, description = "Search by name or email"),
        ("athlete_type" = Option<String>, Query, description = "primary or fellow")
    ),
    responses(
        (status = 200, description = "Paginated athletes", body = Paginated<AthleteWithBookings>),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Athletes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn list_athletes(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(filters): Query<AthleteFilterParams>,
) -> Result<Json<Paginated<AthleteWithBookings>>, AppError> {
    let athletes =
        AthleteService::list(&state.db, state.cache(), user.academic_id, filters).await?;
    Ok(Json(athletes))
}

#[utoipa::path(
    get,
    path = "/api/athletes/{id}",
    params(("id" = Uuid, Path, description = "Athlete ID")),
    responses(
        (status = 200, description = "Athlete with booking count", body = AthleteWithBookings),
        (status = 404, description = "Athlete not found", body = ErrorResponse)
    ),
    tag = "Athletes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_athlete(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<AthleteId>,
) -> Result<Json<AthleteWithBookings>, AppError> {
    let athlete = AthleteService::get(&state.db, user.academic_id, id).await?;
    Ok(Json(athlete))
}

#[utoipa::path(
    post,
    path = "/api/athletes",
    request_body = CreateAthleteDto,
    responses(
        (status = 201, description = "Athlete created", body = AthleteWithBookings),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Athletes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_athlete(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<CreateAthleteDto>,
) -> Result<(StatusCode, Json<AthleteWithBookings>), AppError> {
    let athlete =
        AthleteService::create(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok((StatusCode::CREATED, Json(athlete)))
}

#[utoipa::path(
    put,
    path = "/api/athletes/{id}",
    params(("id" = Uuid, Path, description = "Athlete ID")),
    request_body = UpdateAthleteDto,
    responses(
        (status = 200, description = "Athlete updated", body = AthleteWithBookings),
        (status = 404, description = "Athlete not found", body = ErrorResponse)
    ),
    tag = "Athletes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_athlete(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<AthleteId>,
    ValidatedJson(dto): ValidatedJson<UpdateAthleteDto>,
) -> Result<Json<AthleteWithBookings>, AppError> {
    let athlete =
        AthleteService::update(&state.db, state.cache(), user.academic_id, id, dto).await?;
    Ok(Json(athlete))
}

#[utoipa::path(
    delete,
    path = "/api/athletes/{id}",
    params(("id" = Uuid, Path, description = "Athlete ID")),
    responses(
        (status = 204, description = "Athlete deleted"),
        (status = 404, description = "Athlete not found", body = ErrorResponse)
    ),
    tag = "Athletes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn delete_athlete(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<AthleteId>,
) -> Result<StatusCode, AppError> {
    AthleteService::delete(&state.db, state.cache(), user.academic_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/athletes/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Athletes deleted", body = BulkDeleteResponse)
    ),
    tag = "Athletes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn bulk_delete_athletes(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted =
        AthleteService::bulk_delete(&state.db, state.cache(), user.academic_id, dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
