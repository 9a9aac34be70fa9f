//! Academy locations (branches) with their sports and amenities.

use academix_core::PaginationParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AcademicId, AmenityId, CityId, LocationId, SportId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: LocationId,
    pub academic_id: AcademicId,
    pub name: String,
    pub name_in_google_map: Option<String>,
    pub url: Option<String>,
    pub city_id: Option<CityId>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LocationDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub location: Location,
    pub city_name: Option<String>,
    pub sport_ids: Vec<SportId>,
    pub amenity_ids: Vec<AmenityId>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateLocationDto {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: String,
    #[validate(length(max = 255, message = "Map name is too long"))]
    pub name_in_google_map: Option<String>,
    #[validate(url(message = "Enter a valid URL"))]
    pub url: Option<String>,
    pub city_id: Option<CityId>,
    /// The academy's first location is always the default
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sport_ids: Vec<SportId>,
    #[serde(default)]
    pub amenity_ids: Vec<AmenityId>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateLocationDto {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Map name is too long"))]
    pub name_in_google_map: Option<String>,
    #[validate(url(message = "Enter a valid URL"))]
    pub url: Option<String>,
    pub city_id: Option<CityId>,
    /// Only `true` is meaningful: another location must be promoted to clear the flag
    pub is_default: Option<bool>,
    pub sport_ids: Option<Vec<SportId>>,
    pub amenity_ids: Option<Vec<AmenityId>>,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct LocationFilterParams {
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        let dto = UpdateLocationDto {
            url: Some("not a url".to_string()),
            ..Default::default()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("url"));
    }

    #[test]
    fn test_create_defaults() {
        let dto: CreateLocationDto = serde_json::from_str(r#"{"name":"North Court"}"#).unwrap();
        assert!(!dto.is_default);
        assert!(dto.sport_ids.is_empty());
        assert!(dto.validate().is_ok());
    }
}
