//! Athletes registered with an academy.

use academix_core::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AcademicId, AthleteId};
use crate::value_types::{AthleteType, Gender, validate_phone};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Athlete {
    pub id: AthleteId,
    pub academic_id: AcademicId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub athlete_type: AthleteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AthleteWithBookings {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub athlete: Athlete,
    pub bookings_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateAthleteDto {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub athlete_type: Option<AthleteType>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateAthleteDto {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub athlete_type: Option<AthleteType>,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct AthleteFilterParams {
    /// Matches first name, last name or email
    pub search: Option<String>,
    pub athlete_type: Option<AthleteType>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn athlete(phone: Option<&str>, email: Option<&str>) -> CreateAthleteDto {
        CreateAthleteDto {
            first_name: "Omar".to_string(),
            last_name: "Haddad".to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            gender: None,
            date_of_birth: None,
            athlete_type: None,
        }
    }

    #[test]
    fn test_contact_fields_are_optional() {
        assert!(athlete(None, None).validate().is_ok());
    }

    #[test]
    fn test_invalid_phone_is_reported_on_phone() {
        let errors = athlete(Some("12ab"), None).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }

    #[test]
    fn test_invalid_email_is_reported_on_email() {
        let errors = athlete(Some("+966 55 123 4567"), Some("omar@"))
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(!errors.field_errors().contains_key("phone"));
    }
}
