use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse};

use super::model::{DashboardParams, DashboardResponse};
use super::service::DashboardService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;

/// Booking and revenue totals for a period, compared with the period before it.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(DashboardParams),
    responses(
        (status = 200, description = "Dashboard for the requested window", body = DashboardResponse),
        (status = 403, description = "Academy not onboarded", body = ErrorResponse),
        (status = 422, description = "Invalid date range", body = ErrorResponse)
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard =
        DashboardService::summary(&state.db, state.cache(), user.academic_id, params).await?;
    Ok(Json(dashboard))
}
