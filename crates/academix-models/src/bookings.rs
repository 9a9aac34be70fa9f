//! Bookings of an athlete onto a package, their pricing and the calendar view.

use std::collections::BTreeMap;

use academix_core::{AppError, PaginationParams};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AcademicId, AthleteId, BookingId, LocationId, PackageId, ProgramId, PromoCodeId};
use crate::programs::Package;
use crate::promo_codes::{PromoCode, round_money};
use crate::value_types::BookingStatus;

/// Widest window the calendar endpoint serves, in days.
pub const MAX_CALENDAR_DAYS: i64 = 62;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: BookingId,
    pub academic_id: AcademicId,
    pub athlete_id: AthleteId,
    pub package_id: PackageId,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "16:00:00")]
    pub time: NaiveTime,
    pub price: f64,
    pub status: BookingStatus,
    pub promo_code_id: Option<PromoCodeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with the names the list and calendar views display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookingDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub booking: Booking,
    pub athlete_name: String,
    pub program_id: ProgramId,
    pub program_name: String,
    pub package_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub sport_name: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBookingDto {
    pub athlete_id: AthleteId,
    pub package_id: PackageId,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "16:00:00")]
    pub time: NaiveTime,
    #[validate(length(min = 1, max = 40, message = "Promo code is invalid"))]
    pub promo_code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateBookingStatusDto {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct BookingFilterParams {
    pub status: Option<BookingStatus>,
    pub program_id: Option<ProgramId>,
    pub location_id: Option<LocationId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarParams {
    /// First day shown (inclusive)
    pub from: NaiveDate,
    /// Last day shown (inclusive)
    pub to: NaiveDate,
}

impl CalendarParams {
    pub fn validate_range(&self) -> Result<(), AppError> {
        validate_calendar_range(self.from, self.to)
    }
}

pub fn validate_calendar_range(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if to < from {
        return Err(AppError::invalid_field(
            "to",
            "End date must be on or after the start date",
        ));
    }
    if (to - from).num_days() + 1 > MAX_CALENDAR_DAYS {
        return Err(AppError::invalid_field(
            "to",
            format!("Calendar range cannot exceed {} days", MAX_CALENDAR_DAYS),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub bookings: Vec<BookingDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<CalendarDay>,
}

/// Groups bookings by day, ordered by date then time. Days without bookings
/// are omitted.
pub fn group_by_date(bookings: Vec<BookingDetail>) -> Vec<CalendarDay> {
    let mut days: BTreeMap<NaiveDate, Vec<BookingDetail>> = BTreeMap::new();
    for booking in bookings {
        days.entry(booking.booking.date).or_default().push(booking);
    }

    days.into_iter()
        .map(|(date, mut bookings)| {
            bookings.sort_by_key(|b| b.booking.time);
            CalendarDay { date, bookings }
        })
        .collect()
}

impl BookingStatus {
    /// Pending bookings may be settled either way; successful ones may only
    /// be cancelled. Rejected and cancelled bookings are final.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (
                BookingStatus::Pending,
                BookingStatus::Success | BookingStatus::Rejected | BookingStatus::Cancelled
            ) | (BookingStatus::Success, BookingStatus::Cancelled)
        )
    }

    /// Statuses that hold a seat in the package.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceQuote {
    pub base: f64,
    pub discount: f64,
    pub entry_fees: f64,
    pub total: f64,
}

/// Prices a booking.
///
/// The promo code discounts the package price only; entry fees are added
/// afterwards and only on an athlete's first booking. A package's own entry
/// fees win over the academy's when they are set.
pub fn quote_price(
    package: &Package,
    academic_entry_fees: f64,
    first_booking: bool,
    promo: Option<&PromoCode>,
    at: DateTime<Utc>,
) -> Result<PriceQuote, AppError> {
    let base = package.price;
    let discounted = match promo {
        Some(code) => code.apply_to(base, at)?,
        None => base,
    };
    let entry_fees = if !first_booking {
        0.0
    } else if package.entry_fees > 0.0 {
        package.entry_fees
    } else {
        academic_entry_fees.max(0.0)
    };

    Ok(PriceQuote {
        base,
        discount: round_money(base - discounted),
        entry_fees,
        total: round_money(discounted + entry_fees),
    })
}

/// Rejects dates outside the package window and full packages.
pub fn check_bookable(
    package: &Package,
    date: NaiveDate,
    active_bookings: i64,
) -> Result<(), AppError> {
    if !package.covers(date) {
        return Err(AppError::invalid_field(
            "date",
            format!(
                "Date must be between {} and {}",
                package.start_date, package.end_date
            ),
        ));
    }
    if let Some(capacity) = package.capacity {
        if active_bookings >= i64::from(capacity) {
            return Err(AppError::conflict("Package is fully booked").with_field("package_id"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::DiscountType;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn package(price: f64, entry_fees: f64, capacity: Option<i32>) -> Package {
        Package {
            id: PackageId::new(),
            program_id: ProgramId::new(),
            name: "Autumn".to_string(),
            price,
            entry_fees,
            session_per_week: 2,
            capacity,
            start_date: date(2025, 9, 1),
            end_date: date(2025, 11, 30),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn promo(discount_type: DiscountType, value: f64) -> PromoCode {
        let now = Utc::now();
        PromoCode {
            id: PromoCodeId::new(),
            academic_id: AcademicId::new(),
            code: "WELCOME".to_string(),
            discount_type,
            discount_value: value,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            created_at: now,
            updated_at: now,
        }
    }

    fn detail(day: NaiveDate, hour: u32) -> BookingDetail {
        BookingDetail {
            booking: Booking {
                id: BookingId::new(),
                academic_id: AcademicId::new(),
                athlete_id: AthleteId::new(),
                package_id: PackageId::new(),
                date: day,
                time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                price: 100.0,
                status: BookingStatus::Pending,
                promo_code_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            athlete_name: "Sara Ali".to_string(),
            program_id: ProgramId::new(),
            program_name: "U12 Football".to_string(),
            package_name: "Autumn".to_string(),
            location_id: LocationId::new(),
            location_name: "North Field".to_string(),
            sport_name: "Football".to_string(),
        }
    }

    #[test]
    fn test_first_booking_pays_entry_fees() {
        let quote = quote_price(&package(400.0, 0.0, None), 150.0, true, None, Utc::now()).unwrap();
        assert_eq!(quote.entry_fees, 150.0);
        assert_eq!(quote.total, 550.0);

        let quote = quote_price(&package(400.0, 0.0, None), 150.0, false, None, Utc::now()).unwrap();
        assert_eq!(quote.entry_fees, 0.0);
        assert_eq!(quote.total, 400.0);
    }

    #[test]
    fn test_package_entry_fees_override_academy() {
        let quote = quote_price(&package(400.0, 50.0, None), 150.0, true, None, Utc::now()).unwrap();
        assert_eq!(quote.entry_fees, 50.0);
    }

    #[test]
    fn test_discount_applies_to_package_price_only() {
        let code = promo(DiscountType::Percentage, 50.0);
        let quote =
            quote_price(&package(400.0, 100.0, None), 0.0, true, Some(&code), Utc::now()).unwrap();
        assert_eq!(quote.discount, 200.0);
        assert_eq!(quote.total, 300.0);
    }

    #[test]
    fn test_expired_promo_rejects_quote() {
        let code = promo(DiscountType::Fixed, 20.0);
        let later = Utc::now() + Duration::days(3);
        let err = quote_price(&package(400.0, 0.0, None), 0.0, false, Some(&code), later)
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("promo_code"));
    }

    #[test]
    fn test_status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Success));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Success.can_transition_to(Cancelled));

        assert!(!Success.can_transition_to(Pending));
        assert!(!Success.can_transition_to(Rejected));
        assert!(!Cancelled.can_transition_to(Success));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_date_outside_window_rejected() {
        let err = check_bookable(&package(100.0, 0.0, None), date(2025, 12, 1), 0).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("date"));
        assert!(check_bookable(&package(100.0, 0.0, None), date(2025, 11, 30), 0).is_ok());
    }

    #[test]
    fn test_full_package_rejected() {
        let full = package(100.0, 0.0, Some(2));
        assert!(check_bookable(&full, date(2025, 9, 10), 1).is_ok());
        let err: AppError = check_bookable(&full, date(2025, 9, 10), 2).unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[test]
    fn test_calendar_range_limits() {
        assert!(validate_calendar_range(date(2025, 9, 1), date(2025, 9, 30)).is_ok());
        assert!(validate_calendar_range(date(2025, 9, 1), date(2025, 11, 1)).is_ok());
        assert!(validate_calendar_range(date(2025, 9, 1), date(2025, 11, 2)).is_err());
        assert!(validate_calendar_range(date(2025, 9, 2), date(2025, 9, 1)).is_err());
    }

    #[test]
    fn test_group_by_date_orders_days_and_times() {
        let days = group_by_date(vec![
            detail(date(2025, 9, 3), 18),
            detail(date(2025, 9, 1), 17),
            detail(date(2025, 9, 3), 9),
        ]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2025, 9, 1));
        assert_eq!(days[1].bookings.len(), 2);
        assert_eq!(days[1].bookings[0].booking.time.format("%H").to_string(), "09");
    }
}
