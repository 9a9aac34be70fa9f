//! # Academix CLI
//!
//! Administration and seeding utilities behind the `academix-cli` binary.
//!
//! ```ignore
//! use academix_cli::seeder::{seed_academy, AcademySeedConfig};
//!
//! seed_reference(&pool).await?;
//! seed_academy(&pool, academic_id, AcademySeedConfig { athletes: 200, coaches: 8 }).await?;
//! ```

pub mod admin;
pub mod seeder;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
