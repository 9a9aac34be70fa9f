//! Promo codes and discount arithmetic.

use std::borrow::Cow;

use academix_core::{AppError, PaginationParams, serde::deserialize_optional_bool};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::{AcademicId, PromoCodeId};
use crate::value_types::DiscountType;

/// Characters used for generated codes; `0/O` and `1/I` are left out.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const GENERATED_CODE_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PromoCode {
    pub id: PromoCodeId,
    pub academic_id: AcademicId,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }

    /// Applies the code to `price` at instant `at`. Inactive codes are
    /// rejected rather than silently ignored.
    pub fn apply_to(&self, price: f64, at: DateTime<Utc>) -> Result<f64, AppError> {
        if at < self.start_date {
            return Err(AppError::invalid_field(
                "promo_code",
                "Promo code is not active yet",
            ));
        }
        if at > self.end_date {
            return Err(AppError::invalid_field("promo_code", "Promo code has expired"));
        }
        Ok(apply_discount(price, self.discount_type, self.discount_value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PromoCodeWithUsage {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub promo_code: PromoCode,
    /// Bookings that used this code
    pub times_used: i64,
}

/// Fixed codes subtract, percentage codes scale. Never returns less than zero.
pub fn apply_discount(price: f64, discount_type: DiscountType, value: f64) -> f64 {
    let discounted = match discount_type {
        DiscountType::Fixed => price - value,
        DiscountType::Percentage => price * (1.0 - value.clamp(0.0, 100.0) / 100.0),
    };
    round_money(discounted.max(0.0))
}

/// Rounds to two decimal places.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Codes are matched case-insensitively and stored upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GENERATED_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

fn validate_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if code.len() < 3 || code.len() > 40 || !valid_chars {
        return Err(ValidationError::new("code").with_message(Cow::Borrowed(
            "Code must be 3-40 letters, digits, dashes or underscores",
        )));
    }
    Ok(())
}

fn field_error(field: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("promo_code").with_message(Cow::Borrowed(message));
    err.add_param(Cow::Borrowed("field"), &field);
    err
}

/// Cross-field rules shared by create and (merged) update.
pub fn check_promo_terms(
    discount_type: DiscountType,
    discount_value: f64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if discount_type == DiscountType::Percentage && discount_value > 100.0 {
        return Err(field_error(
            "discount_value",
            "Percentage discount cannot exceed 100",
        ));
    }
    if end_date <= start_date {
        return Err(field_error("end_date", "End date must be after the start date"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "check_create_terms"))]
pub struct CreatePromoCodeDto {
    #[validate(custom(function = "validate_code"))]
    pub code: String,
    pub discount_type: DiscountType,
    #[validate(range(exclusive_min = 0.0, message = "Discount must be greater than zero"))]
    pub discount_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

fn check_create_terms(dto: &CreatePromoCodeDto) -> Result<(), ValidationError> {
    check_promo_terms(
        dto.discount_type,
        dto.discount_value,
        dto.start_date,
        dto.end_date,
    )
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdatePromoCodeDto {
    #[validate(custom(function = "validate_code"))]
    pub code: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(range(exclusive_min = 0.0, message = "Discount must be greater than zero"))]
    pub discount_value: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct PromoCodeFilterParams {
    pub code: Option<String>,
    /// Only codes valid right now
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub active_only: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeneratedCode {
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::{SeedableRng, rngs::StdRng};

    fn promo(discount_type: DiscountType, value: f64) -> PromoCode {
        let now = Utc::now();
        PromoCode {
            id: PromoCodeId::new(),
            academic_id: AcademicId::new(),
            code: "SUMMER25".to_string(),
            discount_type,
            discount_value: value,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fixed_discount() {
        assert_eq!(apply_discount(500.0, DiscountType::Fixed, 75.0), 425.0);
    }

    #[test]
    fn test_percentage_discount() {
        assert_eq!(apply_discount(400.0, DiscountType::Percentage, 25.0), 300.0);
        assert_eq!(apply_discount(99.99, DiscountType::Percentage, 10.0), 89.99);
    }

    #[test]
    fn test_discount_never_below_zero() {
        assert_eq!(apply_discount(50.0, DiscountType::Fixed, 80.0), 0.0);
        assert_eq!(apply_discount(50.0, DiscountType::Percentage, 100.0), 0.0);
    }

    #[test]
    fn test_apply_to_active_code() {
        let code = promo(DiscountType::Percentage, 50.0);
        assert_eq!(code.apply_to(300.0, Utc::now()).unwrap(), 150.0);
    }

    #[test]
    fn test_expired_and_future_codes_rejected() {
        let code = promo(DiscountType::Fixed, 10.0);

        let err = code.apply_to(100.0, Utc::now() + Duration::days(60)).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("promo_code"));
        assert_eq!(err.error.to_string(), "Promo code has expired");

        let err = code.apply_to(100.0, Utc::now() - Duration::days(5)).unwrap_err();
        assert_eq!(err.error.to_string(), "Promo code is not active yet");
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  summer-25 "), "SUMMER-25");
    }

    #[test]
    fn test_generated_codes_use_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = generate_code(&mut rng);
        assert_eq!(code.len(), GENERATED_CODE_LEN);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_percentage_over_100_rejected() {
        let now = Utc::now();
        let dto = CreatePromoCodeDto {
            code: "HALF".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 150.0,
            start_date: now,
            end_date: now + Duration::days(7),
        };
        let err = AppError::from_validation(&dto.validate().unwrap_err());
        assert_eq!(err.field.as_deref(), Some("discount_value"));
    }

    #[test]
    fn test_end_must_follow_start() {
        let now = Utc::now();
        let result = check_promo_terms(DiscountType::Fixed, 10.0, now, now);
        assert!(result.is_err());
    }

    #[test]
    fn test_code_format() {
        assert!(validate_code("WELCOME_10").is_ok());
        assert!(validate_code("ab").is_err());
        assert!(validate_code("NO SPACES").is_err());
    }

    #[test]
    fn test_active_only_filter_from_query_string() {
        let filters: PromoCodeFilterParams =
            serde_json::from_str(r#"{"active_only":"true","code":"sum"}"#).unwrap();
        assert_eq!(filters.active_only, Some(true));
    }
}
