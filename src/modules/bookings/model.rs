pub use academix_models::bookings::{
    Booking, BookingDetail, BookingFilterParams, CalendarParams, CalendarResponse,
    CreateBookingDto, UpdateBookingStatusDto,
};
