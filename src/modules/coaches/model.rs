pub use academix_models::coaches::{
    Coach, CoachDetail, CoachFilterParams, CreateCoachDto, UpdateCoachDto,
};
