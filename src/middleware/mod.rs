//! Authentication extractors and route guards.
//!
//! - [`auth`]: `AuthUser`, `AdminUser` and `AcademicUser` extractors
//! - [`role`]: Middleware rejecting callers without the required role
//! - [`onboarding`]: Middleware gating routes on a finished onboarding
//!
//! Extractors cache the decoded claims in the request extensions, so a guard
//! followed by an extractor verifies the token once.
//!
//! ```ignore
//! async fn list_coaches(academic: AcademicUser, ...) -> Result<..., AppError> {
//!     CoachService::list(&state.db, academic.academic_id, filters).await
//! }
//! ```

pub mod auth;
pub mod onboarding;
pub mod role;
