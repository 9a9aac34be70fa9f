//! # Academix Core
//!
//! Core types, errors, and utilities for the Academix API.
//!
//! - [`errors`]: Application error type rendered as `{ error, field? }`
//! - [`pagination`]: Page/offset pagination parameters and metadata
//! - [`password`]: bcrypt password hashing
//! - [`serde`]: Query-string friendly deserializers
//!
//! # Example
//!
//! ```ignore
//! use academix_core::{AppError, PaginationParams};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Coach not found"));
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorResponse};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
