use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, PromoCodeId};

use super::model::{
    CreatePromoCodeDto, GeneratedCode, PromoCodeFilterParams, PromoCodeWithUsage,
    UpdatePromoCodeDto,
};
use super::service::PromoCodeService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/promo-codes",
    params(
        PaginationParams,
        ("code" = Option<String>, Query, description = "Search by code"),
        ("active_only" = Option<bool>, Query, description = "Only codes valid right now")
    ),
    responses(
        (status = 200, description = "Paginated promo codes", body = Paginated<PromoCodeWithUsage>),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn list_promo_codes(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(filters): Query<PromoCodeFilterParams>,
) -> Result<Json<Paginated<PromoCodeWithUsage>>, AppError> {
    let codes =
        PromoCodeService::list(&state.db, state.cache(), user.academic_id, filters).await?;
    Ok(Json(codes))
}

#[utoipa::path(
    get,
    path = "/api/promo-codes/{id}",
    params(("id" = Uuid, Path, description = "Promo code ID")),
    responses(
        (status = 200, description = "Promo code with usage count", body = PromoCodeWithUsage),
        (status = 404, description = "Promo code not found", body = ErrorResponse)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_promo_code(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<PromoCodeId>,
) -> Result<Json<PromoCodeWithUsage>, AppError> {
    let promo_code = PromoCodeService::get(&state.db, user.academic_id, id).await?;
    Ok(Json(promo_code))
}

#[utoipa::path(
    post,
    path = "/api/promo-codes",
    request_body = CreatePromoCodeDto,
    responses(
        (status = 201, description = "Promo code created", body = PromoCodeWithUsage),
        (status = 409, description = "Code already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_promo_code(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<CreatePromoCodeDto>,
) -> Result<(StatusCode, Json<PromoCodeWithUsage>), AppError> {
    let promo_code =
        PromoCodeService::create(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok((StatusCode::CREATED, Json(promo_code)))
}

#[utoipa::path(
    put,
    path = "/api/promo-codes/{id}",
    params(("id" = Uuid, Path, description = "Promo code ID")),
    request_body = UpdatePromoCodeDto,
    responses(
        (status = 200, description = "Promo code updated", body = PromoCodeWithUsage),
        (status = 404, description = "Promo code not found", body = ErrorResponse),
        (status = 409, description = "Code already exists", body = ErrorResponse)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_promo_code(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<PromoCodeId>,
    ValidatedJson(dto): ValidatedJson<UpdatePromoCodeDto>,
) -> Result<Json<PromoCodeWithUsage>, AppError> {
    let promo_code =
        PromoCodeService::update(&state.db, state.cache(), user.academic_id, id, dto).await?;
    Ok(Json(promo_code))
}

#[utoipa::path(
    delete,
    path = "/api/promo-codes/{id}",
    params(("id" = Uuid, Path, description = "Promo code ID")),
    responses(
        (status = 204, description = "Promo code deleted"),
        (status = 404, description = "Promo code not found", body = ErrorResponse)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn delete_promo_code(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<PromoCodeId>,
) -> Result<StatusCode, AppError> {
    PromoCodeService::delete(&state.db, state.cache(), user.academic_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/promo-codes/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Promo codes deleted", body = BulkDeleteResponse)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn bulk_delete_promo_codes(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted =
        PromoCodeService::bulk_delete(&state.db, state.cache(), user.academic_id, dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

#[utoipa::path(
    post,
    path = "/api/promo-codes/generate",
    responses(
        (status = 200, description = "An unused random code", body = GeneratedCode)
    ),
    tag = "Promo codes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn generate_promo_code(
    State(state): State<AppState>,
    user: AcademicUser,
) -> Result<Json<GeneratedCode>, AppError> {
    let code = PromoCodeService::generate(&state.db, user.academic_id).await?;
    Ok(Json(code))
}
