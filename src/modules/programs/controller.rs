use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::{BulkDeleteDto, BulkDeleteResponse, PackageId, ProgramId};

use super::model::{
    CreatePackageDto, CreateProgramDto, PackageWithSchedules, ProgramDetail, ProgramFilterParams,
    ProgramSummary, UpdatePackageDto, UpdateProgramDto,
};
use super::service::{PackageService, ProgramService};
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/programs",
    params(
        PaginationParams,
        ("name" = Option<String>, Query, description = "Search by name"),
        ("sport_id" = Option<Uuid>, Query, description = "Filter by sport"),
        ("location_id" = Option<Uuid>, Query, description = "Filter by location"),
        ("program_type" = Option<String>, Query, description = "team, private, semi_private or assessment")
    ),
    responses(
        (status = 200, description = "Paginated programs", body = Paginated<ProgramSummary>),
        (status = 403, description = "Academy admin access required", body = ErrorResponse)
    ),
    tag = "Programs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn list_programs(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(filters): Query<ProgramFilterParams>,
) -> Result<Json<Paginated<ProgramSummary>>, AppError> {
    let programs =
        ProgramService::list(&state.db, state.cache(), user.academic_id, filters).await?;
    Ok(Json(programs))
}

#[utoipa::path(
    get,
    path = "/api/programs/{id}",
    params(("id" = Uuid, Path, description = "Program ID")),
    responses(
        (status = 200, description = "Program with coaches, packages and schedules", body = ProgramDetail),
        (status = 404, description = "Program not found", body = ErrorResponse)
    ),
    tag = "Programs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_program(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<ProgramId>,
) -> Result<Json<ProgramDetail>, AppError> {
    let program = ProgramService::get(&state.db, user.academic_id, id).await?;
    Ok(Json(program))
}

#[utoipa::path(
    post,
    path = "/api/programs",
    request_body = CreateProgramDto,
    responses(
        (status = 201, description = "Program created", body = ProgramDetail),
        (status = 422, description = "Validation error or foreign location, sport or coach", body = ErrorResponse)
    ),
    tag = "Programs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_program(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<CreateProgramDto>,
) -> Result<(StatusCode, Json<ProgramDetail>), AppError> {
    let program =
        ProgramService::create(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

#[utoipa::path(
    put,
    path = "/api/programs/{id}",
    params(("id" = Uuid, Path, description = "Program ID")),
    request_body = UpdateProgramDto,
    responses(
        (status = 200, description = "Program updated", body = ProgramDetail),
        (status = 404, description = "Program not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Programs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_program(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<ProgramId>,
    ValidatedJson(dto): ValidatedJson<UpdateProgramDto>,
) -> Result<Json<ProgramDetail>, AppError> {
    let program =
        ProgramService::update(&state.db, state.cache(), user.academic_id, id, dto).await?;
    Ok(Json(program))
}

#[utoipa::path(
    delete,
    path = "/api/programs/{id}",
    params(("id" = Uuid, Path, description = "Program ID")),
    responses(
        (status = 204, description = "Program deleted"),
        (status = 404, description = "Program not found", body = ErrorResponse)
    ),
    tag = "Programs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn delete_program(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<ProgramId>,
) -> Result<StatusCode, AppError> {
    ProgramService::delete(&state.db, state.cache(), user.academic_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/programs/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Programs deleted", body = BulkDeleteResponse)
    ),
    tag = "Programs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn bulk_delete_programs(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted =
        ProgramService::bulk_delete(&state.db, state.cache(), user.academic_id, dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

#[utoipa::path(
    post,
    path = "/api/programs/{id}/packages",
    params(("id" = Uuid, Path, description = "Program ID")),
    request_body = CreatePackageDto,
    responses(
        (status = 201, description = "Package and schedules created", body = PackageWithSchedules),
        (status = 404, description = "Program not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_package(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(program_id): Path<ProgramId>,
    ValidatedJson(dto): ValidatedJson<CreatePackageDto>,
) -> Result<(StatusCode, Json<PackageWithSchedules>), AppError> {
    let package =
        PackageService::create(&state.db, state.cache(), user.academic_id, program_id, dto)
            .await?;
    Ok((StatusCode::CREATED, Json(package)))
}

#[utoipa::path(
    put,
    path = "/api/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    request_body = UpdatePackageDto,
    responses(
        (status = 200, description = "Package updated", body = PackageWithSchedules),
        (status = 404, description = "Package not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn update_package(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<PackageId>,
    ValidatedJson(dto): ValidatedJson<UpdatePackageDto>,
) -> Result<Json<PackageWithSchedules>, AppError> {
    let package =
        PackageService::update(&state.db, state.cache(), user.academic_id, id, dto).await?;
    Ok(Json(package))
}

#[utoipa::path(
    delete,
    path = "/api/packages/{id}",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 204, description = "Package deleted"),
        (status = 404, description = "Package not found", body = ErrorResponse)
    ),
    tag = "Packages",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn delete_package(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<PackageId>,
) -> Result<StatusCode, AppError> {
    PackageService::delete(&state.db, state.cache(), user.academic_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
