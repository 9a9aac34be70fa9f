use axum::{Json, extract::State};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse};
use academix_models::academics::{AcademicDetail, UpdateAcademicDto};

use super::service::AcademyService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/academy",
    responses(
        (status = 200, description = "The academy's profile", body = AcademicDetail),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Academy",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_academy(
    State(state): State<AppState>,
    user: AcademicUser,
) -> Result<Json<AcademicDetail>, AppError> {
    let profile = AcademyService::get_profile(&state.db, state.cache(), user.academic_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/academy",
    request_body = UpdateAcademicDto,
    responses(
        (status = 200, description = "Profile updated", body = AcademicDetail),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Academy",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_academy(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<UpdateAcademicDto>,
) -> Result<Json<AcademicDetail>, AppError> {
    let profile =
        AcademyService::update_profile(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok(Json(profile))
}
