pub use academix_models::reference::{City, CityFilterParams, CreateCityDto, UpdateCityDto};
