pub use academix_models::reference::{CreateSportDto, ReferenceFilterParams, Sport, UpdateSportDto};
