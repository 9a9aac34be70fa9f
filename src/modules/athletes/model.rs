pub use academix_models::athletes::{
    Athlete, AthleteFilterParams, AthleteWithBookings, CreateAthleteDto, UpdateAthleteDto,
};
