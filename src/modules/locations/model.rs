pub use academix_models::locations::{
    CreateLocationDto, Location, LocationDetail, LocationFilterParams, UpdateLocationDto,
};
