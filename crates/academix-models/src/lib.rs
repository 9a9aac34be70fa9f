//! # Academix Models
//!
//! Domain models, DTOs and the pure rules of the Academix API.
//!
//! Entities map one-to-one onto database rows (`FromRow`), DTOs carry
//! `validator` rules, and the modules below also hold the logic that needs no
//! database: onboarding completeness, dashboard windows, promo pricing.
//!
//! - [`ids`]: One UUID newtype per table
//! - [`value_types`]: Enums stored as `TEXT` columns, phone validation
//! - [`auth`]: Users, login and token bodies
//! - [`reference`]: Sports, amenities, countries, cities
//! - [`academics`]: Tenants and their profile
//! - [`locations`], [`coaches`], [`athletes`]: Academy resources
//! - [`programs`]: Programs, packages and weekly schedules
//! - [`promo_codes`]: Discount codes and pricing
//! - [`bookings`]: Bookings, calendar grouping, status transitions
//! - [`dashboard`]: Reporting windows and aggregate shapes
//! - [`onboarding`]: Wizard step evaluation
//!
//! # Example
//!
//! ```ignore
//! use academix_models::onboarding::{evaluate, OnboardingFacts};
//!
//! let status = evaluate(&facts, academic.onboarded);
//! if let Some(step) = status.current_step {
//!     println!("continue with {}", step.as_str());
//! }
//! ```

pub mod academics;
pub mod athletes;
pub mod auth;
pub mod bookings;
pub mod coaches;
pub mod common;
pub mod dashboard;
pub mod ids;
pub mod locations;
pub mod onboarding;
pub mod programs;
pub mod promo_codes;
pub mod reference;
pub mod value_types;

pub use common::{BulkDeleteDto, BulkDeleteResponse, MessageResponse};
pub use ids::{
    AcademicId, AmenityId, AthleteId, BookingId, CityId, CoachId, CountryId, LocationId, PackageId,
    ProgramId, PromoCodeId, ScheduleId, SportId, UserId,
};
pub use value_types::{
    AcademicStatus, AthleteType, BookingStatus, DiscountType, Gender, ProgramGender, ProgramType,
    Role, Weekday,
};
