//! Programs, their priced packages and weekly schedules.

use std::borrow::Cow;

use academix_core::PaginationParams;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::{AcademicId, CoachId, LocationId, PackageId, ProgramId, ScheduleId, SportId};
use crate::value_types::{ProgramGender, ProgramType, Weekday};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Program {
    pub id: ProgramId,
    pub academic_id: AcademicId,
    pub location_id: LocationId,
    pub sport_id: SportId,
    pub name: String,
    pub description: Option<String>,
    pub program_type: ProgramType,
    pub gender: Option<ProgramGender>,
    pub start_date_of_birth: Option<NaiveDate>,
    pub end_date_of_birth: Option<NaiveDate>,
    pub number_of_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List row: the program with display names and counts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProgramSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub program: Program,
    pub location_name: String,
    pub sport_name: String,
    pub coach_ids: Vec<CoachId>,
    pub packages_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: Program,
    pub coach_ids: Vec<CoachId>,
    pub packages: Vec<PackageWithSchedules>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Package {
    pub id: PackageId,
    pub program_id: ProgramId,
    pub name: String,
    pub price: f64,
    pub entry_fees: f64,
    pub session_per_week: i32,
    /// Maximum active bookings; unlimited when absent
    pub capacity: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Package {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: ScheduleId,
    pub package_id: PackageId,
    pub day: Weekday,
    #[schema(value_type = String, example = "16:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:30:00")]
    pub end_time: NaiveTime,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PackageWithSchedules {
    #[serde(flatten)]
    pub package: Package,
    pub schedules: Vec<Schedule>,
}

/// Attaches each schedule to its package, ordered by weekday then start
/// time. Schedules of unknown packages are dropped.
pub fn attach_schedules(
    packages: Vec<Package>,
    mut schedules: Vec<Schedule>,
) -> Vec<PackageWithSchedules> {
    schedules.sort_by_key(|s| (s.day.index(), s.start_time));

    packages
        .into_iter()
        .map(|package| {
            let schedules = schedules
                .iter()
                .filter(|s| s.package_id == package.id)
                .cloned()
                .collect();
            PackageWithSchedules { package, schedules }
        })
        .collect()
}

fn range_error(field: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range").with_message(Cow::Borrowed(message));
    err.add_param(Cow::Borrowed("field"), &field);
    err
}

/// `end` must not precede `start`; both bounds are inclusive days.
pub fn check_date_range(
    start: NaiveDate,
    end: NaiveDate,
    field: &'static str,
) -> Result<(), ValidationError> {
    if end < start {
        return Err(range_error(field, "End date must be on or after the start date"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "check_schedule_times"))]
pub struct ScheduleInput {
    pub day: Weekday,
    #[schema(value_type = String, example = "16:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:30:00")]
    pub end_time: NaiveTime,
    #[validate(length(max = 500, message = "Memo is too long"))]
    pub memo: Option<String>,
}

fn check_schedule_times(schedule: &ScheduleInput) -> Result<(), ValidationError> {
    if schedule.end_time <= schedule.start_time {
        return Err(range_error("end_time", "End time must be after the start time"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "check_program_ages"))]
pub struct CreateProgramDto {
    pub location_id: LocationId,
    pub sport_id: SportId,
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: String,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    pub program_type: ProgramType,
    pub gender: Option<ProgramGender>,
    pub start_date_of_birth: Option<NaiveDate>,
    pub end_date_of_birth: Option<NaiveDate>,
    #[validate(range(min = 0, max = 10000, message = "Seats cannot be negative"))]
    pub number_of_seats: Option<i32>,
    #[serde(default)]
    pub coach_ids: Vec<CoachId>,
}

fn check_program_ages(dto: &CreateProgramDto) -> Result<(), ValidationError> {
    match (dto.start_date_of_birth, dto.end_date_of_birth) {
        (Some(start), Some(end)) => check_date_range(start, end, "end_date_of_birth"),
        _ => Ok(()),
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateProgramDto {
    pub location_id: Option<LocationId>,
    pub sport_id: Option<SportId>,
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: Option<String>,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    pub program_type: Option<ProgramType>,
    pub gender: Option<ProgramGender>,
    pub start_date_of_birth: Option<NaiveDate>,
    pub end_date_of_birth: Option<NaiveDate>,
    #[validate(range(min = 0, max = 10000, message = "Seats cannot be negative"))]
    pub number_of_seats: Option<i32>,
    pub coach_ids: Option<Vec<CoachId>>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "check_package_dates"))]
pub struct CreatePackageDto {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "Entry fees cannot be negative"))]
    pub entry_fees: Option<f64>,
    #[validate(range(min = 1, max = 7, message = "Sessions per week must be between 1 and 7"))]
    pub session_per_week: i32,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    #[validate(nested)]
    pub schedules: Vec<ScheduleInput>,
}

fn check_package_dates(dto: &CreatePackageDto) -> Result<(), ValidationError> {
    check_date_range(dto.start_date, dto.end_date, "end_date")
}

/// Partial package update. When `schedules` is present it replaces every
/// existing schedule of the package.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdatePackageDto {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Entry fees cannot be negative"))]
    pub entry_fees: Option<f64>,
    #[validate(range(min = 1, max = 7, message = "Sessions per week must be between 1 and 7"))]
    pub session_per_week: Option<i32>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(nested)]
    pub schedules: Option<Vec<ScheduleInput>>,
}

#[derive(Debug, Clone, Default, Hash, Deserialize)]
pub struct ProgramFilterParams {
    pub name: Option<String>,
    pub sport_id: Option<SportId>,
    pub location_id: Option<LocationId>,
    pub program_type: Option<ProgramType>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn package(start: NaiveDate, end: NaiveDate, schedules: Vec<ScheduleInput>) -> CreatePackageDto {
        CreatePackageDto {
            name: "Term 1".to_string(),
            price: 450.0,
            entry_fees: None,
            session_per_week: 2,
            capacity: Some(12),
            start_date: start,
            end_date: end,
            schedules,
        }
    }

    fn slot(start: NaiveTime, end: NaiveTime) -> ScheduleInput {
        ScheduleInput {
            day: Weekday::Mon,
            start_time: start,
            end_time: end,
            memo: None,
        }
    }

    #[test]
    fn test_valid_package() {
        let dto = package(
            date(2025, 9, 1),
            date(2025, 12, 15),
            vec![slot(time(16, 0), time(17, 30))],
        );
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_single_day_package_is_valid() {
        let dto = package(date(2025, 9, 1), date(2025, 9, 1), vec![]);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_end_date_before_start_rejected() {
        let dto = package(date(2025, 9, 1), date(2025, 8, 31), vec![]);
        let errors = dto.validate().unwrap_err();
        let all = errors.field_errors();
        let err = &all.get("__all__").unwrap()[0];
        assert_eq!(err.params.get("field").unwrap(), "end_date");
    }

    #[test]
    fn test_schedule_end_must_follow_start() {
        let dto = package(
            date(2025, 9, 1),
            date(2025, 12, 15),
            vec![slot(time(18, 0), time(18, 0))],
        );
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_negative_price_and_zero_sessions_rejected() {
        let mut dto = package(date(2025, 9, 1), date(2025, 12, 15), vec![]);
        dto.price = -5.0;
        dto.session_per_week = 0;
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("session_per_week"));
    }

    #[test]
    fn test_package_covers_inclusive_window() {
        let package = Package {
            id: PackageId::new(),
            program_id: ProgramId::new(),
            name: "Summer".to_string(),
            price: 300.0,
            entry_fees: 0.0,
            session_per_week: 3,
            capacity: None,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 8, 31),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(package.covers(date(2025, 6, 1)));
        assert!(package.covers(date(2025, 8, 31)));
        assert!(!package.covers(date(2025, 9, 1)));
    }

    #[test]
    fn test_attach_schedules_orders_by_week() {
        let first = Package {
            id: PackageId::new(),
            program_id: ProgramId::new(),
            name: "Mornings".to_string(),
            price: 100.0,
            entry_fees: 0.0,
            session_per_week: 2,
            capacity: None,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 3, 1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut second = first.clone();
        second.id = PackageId::new();

        let schedule = |package_id, day, hour| Schedule {
            id: ScheduleId::new(),
            package_id,
            day,
            start_time: time(hour, 0),
            end_time: time(hour + 1, 0),
            memo: None,
        };
        let schedules = vec![
            schedule(first.id, Weekday::Wed, 9),
            schedule(second.id, Weekday::Mon, 9),
            schedule(first.id, Weekday::Sun, 11),
            schedule(first.id, Weekday::Sun, 8),
            schedule(PackageId::new(), Weekday::Tue, 9),
        ];

        let grouped = attach_schedules(vec![first, second], schedules);
        assert_eq!(grouped.len(), 2);

        let slots: Vec<_> = grouped[0]
            .schedules
            .iter()
            .map(|s| (s.day, s.start_time))
            .collect();
        assert_eq!(
            slots,
            vec![
                (Weekday::Sun, time(8, 0)),
                (Weekday::Sun, time(11, 0)),
                (Weekday::Wed, time(9, 0)),
            ]
        );
        assert_eq!(grouped[1].schedules.len(), 1);
    }

    #[test]
    fn test_schedule_input_from_json() {
        let input: ScheduleInput = serde_json::from_str(
            r#"{"day":"wed","start_time":"16:00:00","end_time":"17:00:00"}"#,
        )
        .unwrap();
        assert_eq!(input.day, Weekday::Wed);
        assert!(input.validate().is_ok());
    }
}
