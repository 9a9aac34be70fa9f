use axum::{Json, extract::State};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse};

use super::model::OnboardingStatus;
use super::service::OnboardingService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/onboarding",
    responses(
        (status = 200, description = "Progress through the five onboarding steps", body = OnboardingStatus),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Onboarding",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_onboarding(
    State(state): State<AppState>,
    user: AcademicUser,
) -> Result<Json<OnboardingStatus>, AppError> {
    let status = OnboardingService::status(&state.db, user.academic_id).await?;
    Ok(Json(status))
}

/// Finishes onboarding. The error's `field` names the first incomplete step.
#[utoipa::path(
    post,
    path = "/api/onboarding/complete",
    responses(
        (status = 200, description = "Academy is onboarded", body = OnboardingStatus),
        (status = 409, description = "A step is still incomplete", body = ErrorResponse)
    ),
    tag = "Onboarding",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    user: AcademicUser,
) -> Result<Json<OnboardingStatus>, AppError> {
    let status = OnboardingService::complete(&state.db, state.cache(), user.academic_id).await?;
    Ok(Json(status))
}
