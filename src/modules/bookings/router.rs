use axum::{
    Router,
    routing::{get, patch},
};

use super::controller::{
    booking_calendar, create_booking, get_booking, list_bookings, update_booking_status,
};
use crate::state::AppState;

pub fn init_bookings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/calendar", get(booking_calendar))
        .route("/{id}", get(get_booking))
        .route("/{id}/status", patch(update_booking_status))
}
