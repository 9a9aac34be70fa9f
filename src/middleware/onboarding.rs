use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use academix_core::AppError;

use crate::middleware::auth::AcademicUser;
use crate::state::AppState;

/// Blocks academies that have not finished onboarding.
pub async fn require_onboarded(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let academic = AcademicUser::from_request_parts(&mut parts, &state).await?;

    let onboarded = sqlx::query_scalar::<_, bool>("SELECT onboarded FROM academics WHERE id = $1")
        .bind(academic.academic_id)
        .fetch_optional(&state.db)
        .await?
        .unwrap_or(false);

    if !onboarded {
        debug!(academic.id = %academic.academic_id, "Rejected request from academy still onboarding");
        return Err(AppError::forbidden("Academy onboarding is not complete"));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
