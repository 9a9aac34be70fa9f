use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use academix_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use academix_models::BookingId;

use super::model::{
    BookingDetail, BookingFilterParams, CalendarParams, CalendarResponse, CreateBookingDto,
    UpdateBookingStatusDto,
};
use super::service::BookingService;
use crate::middleware::auth::AcademicUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        PaginationParams,
        ("status" = Option<String>, Query, description = "pending, success, rejected or cancelled"),
        ("program_id" = Option<Uuid>, Query, description = "Filter by program"),
        ("location_id" = Option<Uuid>, Query, description = "Filter by location"),
        ("from" = Option<String>, Query, description = "Earliest booking date (YYYY-MM-DD)"),
        ("to" = Option<String>, Query, description = "Latest booking date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Paginated bookings", body = Paginated<BookingDetail>),
        (status = 403, description = "Academy not onboarded", body = ErrorResponse)
    ),
    tag = "Bookings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(filters): Query<BookingFilterParams>,
) -> Result<Json<Paginated<BookingDetail>>, AppError> {
    let bookings = BookingService::list(&state.db, state.cache(), user.academic_id, filters).await?;
    Ok(Json(bookings))
}

#[utoipa::path(
    get,
    path = "/api/bookings/calendar",
    params(CalendarParams),
    responses(
        (status = 200, description = "Bookings grouped by day", body = CalendarResponse),
        (status = 422, description = "Range is reversed or longer than 62 days", body = ErrorResponse)
    ),
    tag = "Bookings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn booking_calendar(
    State(state): State<AppState>,
    user: AcademicUser,
    Query(params): Query<CalendarParams>,
) -> Result<Json<CalendarResponse>, AppError> {
    let calendar = BookingService::calendar(&state.db, user.academic_id, params).await?;
    Ok(Json(calendar))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = BookingDetail),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    ),
    tag = "Bookings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(academic.id = %user.academic_id))]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<BookingId>,
) -> Result<Json<BookingDetail>, AppError> {
    let booking = BookingService::get(&state.db, user.academic_id, id).await?;
    Ok(Json(booking))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingDto,
    responses(
        (status = 201, description = "Booking created as pending", body = BookingDetail),
        (status = 409, description = "Package is fully booked", body = ErrorResponse),
        (status = 422, description = "Unknown athlete, package or promo code, or date outside the package", body = ErrorResponse)
    ),
    tag = "Bookings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id))]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AcademicUser,
    ValidatedJson(dto): ValidatedJson<CreateBookingDto>,
) -> Result<(StatusCode, Json<BookingDetail>), AppError> {
    let booking = BookingService::create(&state.db, state.cache(), user.academic_id, dto).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusDto,
    responses(
        (status = 200, description = "Status changed", body = BookingDetail),
        (status = 404, description = "Booking not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    ),
    tag = "Bookings",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(academic.id = %user.academic_id, booking.status = %dto.status))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    user: AcademicUser,
    Path(id): Path<BookingId>,
    ValidatedJson(dto): ValidatedJson<UpdateBookingStatusDto>,
) -> Result<Json<BookingDetail>, AppError> {
    let booking =
        BookingService::update_status(&state.db, state.cache(), user.academic_id, id, dto.status)
            .await?;
    Ok(Json(booking))
}
