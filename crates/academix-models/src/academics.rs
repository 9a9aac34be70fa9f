//! Academies (tenants) and their public profile.

use academix_core::PaginationParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AcademicId, SportId};
use crate::value_types::AcademicStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Academic {
    pub id: AcademicId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub entry_fees: f64,
    pub policy: Option<String>,
    pub status: AcademicStatus,
    pub onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An academic with its sports and how much it holds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcademicDetail {
    #[serde(flatten)]
    pub academic: Academic,
    pub sport_ids: Vec<SportId>,
    pub locations_count: i64,
    pub coaches_count: i64,
    pub programs_count: i64,
    pub athletes_count: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct AcademicCounts {
    pub locations_count: i64,
    pub coaches_count: i64,
    pub programs_count: i64,
    pub athletes_count: i64,
}

/// Registers an academy together with the account that will run it.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAcademicDto {
    #[validate(length(min = 2, max = 150, message = "Name must be between 2 and 150 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Entry fees cannot be negative"))]
    pub entry_fees: Option<f64>,
    #[serde(default)]
    pub sport_ids: Vec<SportId>,
    #[validate(length(min = 1, max = 150, message = "Admin name is required"))]
    pub admin_name: String,
    #[validate(email(message = "Enter a valid admin email"))]
    pub admin_email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub admin_password: String,
}

/// Partial update of an academy profile; used by system admins and by the
/// academy's own admin.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateAcademicDto {
    #[validate(length(min = 2, max = 150, message = "Name must be between 2 and 150 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(length(max = 500, message = "Logo path is too long"))]
    pub logo: Option<String>,
    #[validate(range(min = 0.0, message = "Entry fees cannot be negative"))]
    pub entry_fees: Option<f64>,
    #[validate(length(max = 10000, message = "Policy is too long"))]
    pub policy: Option<String>,
    /// Replaces the academy's sports when present
    pub sport_ids: Option<Vec<SportId>>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateAcademicStatusDto {
    pub status: AcademicStatus,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct AcademicFilterParams {
    pub name: Option<String>,
    pub status: Option<AcademicStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// URL-safe slug: lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "academy".to_string()
    } else {
        slug
    }
}

/// The slug to try on the `attempt`-th collision (`base`, `base-2`, `base-3`, ...).
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Riyadh Padel Club"), "riyadh-padel-club");
        assert_eq!(slugify("  Élite -- Swim & Dive!! "), "lite-swim-dive");
        assert_eq!(slugify("123 Go"), "123-go");
        assert_eq!(slugify("!!!"), "academy");
    }

    #[test]
    fn test_slug_candidates() {
        assert_eq!(slug_candidate("falcons", 1), "falcons");
        assert_eq!(slug_candidate("falcons", 3), "falcons-3");
    }

    #[test]
    fn test_create_requires_admin_credentials() {
        let dto = CreateAcademicDto {
            name: "Falcons".to_string(),
            description: None,
            entry_fees: None,
            sport_ids: vec![],
            admin_name: "Owner".to_string(),
            admin_email: "owner@falcons.com".to_string(),
            admin_password: "short".to_string(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("admin_password"));
    }

    #[test]
    fn test_negative_entry_fees_rejected() {
        let dto = UpdateAcademicDto {
            entry_fees: Some(-1.0),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
