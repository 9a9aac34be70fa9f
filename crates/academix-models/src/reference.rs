//! Reference tables maintained by system admins: sports, amenities,
//! countries and cities.

use academix_core::PaginationParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AmenityId, CityId, CountryId, SportId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Sport {
    pub id: SportId,
    pub name: String,
    /// Stored image path
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSportDto {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSportDto {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Image path is too long"))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Amenity {
    pub id: AmenityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for the tables whose only editable column is `name`
/// (amenities and countries).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct NameDto {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub country_id: CountryId,
    pub country_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCityDto {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    pub country_id: CountryId,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCityDto {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: Option<String>,
    pub country_id: Option<CountryId>,
}

/// `?name=` search plus pagination, shared by sports, amenities and countries.
#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct ReferenceFilterParams {
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct CityFilterParams {
    pub name: Option<String>,
    pub country_id: Option<CountryId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let dto = NameDto {
            name: String::new(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_update_sport_allows_missing_fields() {
        let dto = UpdateSportDto {
            name: None,
            image: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_city_filters_from_query_strings() {
        let filters: CityFilterParams = serde_json::from_str(
            r#"{"name":"jed","country_id":"12345678-1234-1234-1234-123456789abc","page":"2"}"#,
        )
        .unwrap();
        assert_eq!(filters.name.as_deref(), Some("jed"));
        assert!(filters.country_id.is_some());
        assert_eq!(filters.pagination.page(), Some(2));
    }
}
