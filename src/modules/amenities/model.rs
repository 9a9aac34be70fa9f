pub use academix_models::reference::{Amenity, ReferenceFilterParams};
