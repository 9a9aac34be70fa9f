//! Programs and their packages. Packages are created under a program
//! (`POST /programs/{id}/packages`) and edited on their own
//! (`/packages/{id}`).

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_packages_router, init_programs_router};
