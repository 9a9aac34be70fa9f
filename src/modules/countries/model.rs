pub use academix_models::reference::{Country, ReferenceFilterParams};
