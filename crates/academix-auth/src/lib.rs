//! # Academix Auth
//!
//! JWT handling for the Academix API.
//!
//! - [`claims`]: access and refresh token claims
//! - [`jwt`]: token creation and verification
//!
//! Access tokens carry the user's role and, for academy admins, the academic
//! id every tenant-scoped query filters by.
//!
//! ```ignore
//! use academix_auth::{Role, create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "owner@club.com", Role::AcademicAdmin, Some(academic_id), &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.academic_id, Some(academic_id));
//! ```

pub mod claims;
pub mod jwt;

pub use academix_models::value_types::Role;
pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
