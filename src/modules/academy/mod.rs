//! The signed-in academy's own profile.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_academy_router;
