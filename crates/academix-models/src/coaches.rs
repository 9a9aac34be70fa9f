//! Coaches and the sports they teach.

use academix_core::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AcademicId, CoachId, SportId};
use crate::value_types::Gender;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Coach {
    pub id: CoachId,
    pub academic_id: AcademicId,
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CoachDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub coach: Coach,
    pub sport_ids: Vec<SportId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateCoachDto {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: String,
    #[validate(length(max = 150, message = "Title is too long"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Bio is too long"))]
    pub bio: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub image: Option<String>,
    #[serde(default)]
    pub sport_ids: Vec<SportId>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateCoachDto {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: Option<String>,
    #[validate(length(max = 150, message = "Title is too long"))]
    pub title: Option<String>,
    #[validate(length(max = 5000, message = "Bio is too long"))]
    pub bio: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub image: Option<String>,
    pub sport_ids: Option<Vec<SportId>>,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct CoachFilterParams {
    pub name: Option<String>,
    pub sport_id: Option<SportId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        let dto: CreateCoachDto = serde_json::from_str(r#"{"name":""}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_gender_parsed() {
        let dto: CreateCoachDto =
            serde_json::from_str(r#"{"name":"Sara","gender":"female","sport_ids":[]}"#).unwrap();
        assert_eq!(dto.gender, Some(Gender::Female));
    }
}
