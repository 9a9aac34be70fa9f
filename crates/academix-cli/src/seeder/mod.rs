//! Database seeding.
//!
//! Reference data is fixed and idempotent; academy data is fake, generated
//! in parallel with rayon and inserted in multi-row batches.

pub mod academy;
pub mod models;
pub mod reference;

pub use academy::{clear_academy, seed_academy};
pub use models::{AcademySeedConfig, AthleteSeed, CoachSeed};
pub use reference::seed_reference;

/// Rows per multi-value INSERT.
pub(crate) const BATCH_SIZE: usize = 500;
