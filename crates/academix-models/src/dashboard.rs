//! Dashboard periods, comparison windows and the aggregate response.

use academix_core::AppError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::value_types::BookingStatus;

/// Longest custom `from`/`to` range, in days.
pub const MAX_DASHBOARD_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum DashboardPeriod {
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[default]
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "this_month")]
    ThisMonth,
    #[serde(rename = "this_year")]
    ThisYear,
    #[serde(rename = "all_time")]
    AllTime,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardParams {
    /// Named period; ignored when `from` and `to` are given
    pub period: Option<DashboardPeriod>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// The equally long range ending the day before this one starts.
    pub fn previous(&self) -> DateRange {
        let to = self.from - Duration::days(1);
        DateRange {
            from: to - Duration::days(self.days() - 1),
            to,
        }
    }
}

/// The window the dashboard aggregates over. `range` is `None` for all time,
/// which also has nothing to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DashboardWindow {
    pub range: Option<DateRange>,
    pub previous: Option<DateRange>,
}

impl DashboardWindow {
    fn bounded(range: DateRange) -> Self {
        Self {
            range: Some(range),
            previous: Some(range.previous()),
        }
    }

    pub fn from_date(&self) -> Option<NaiveDate> {
        self.range.map(|r| r.from)
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        self.range.map(|r| r.to)
    }
}

pub fn resolve_window(params: &DashboardParams, today: NaiveDate) -> Result<DashboardWindow, AppError> {
    match (params.from, params.to) {
        (Some(from), Some(to)) => {
            let range = DateRange { from, to };
            if to < from {
                return Err(AppError::invalid_field(
                    "to",
                    "End date must be on or after the start date",
                ));
            }
            if range.days() > MAX_DASHBOARD_DAYS {
                return Err(AppError::invalid_field(
                    "to",
                    format!("Range cannot exceed {} days", MAX_DASHBOARD_DAYS),
                ));
            }
            Ok(DashboardWindow::bounded(range))
        }
        (Some(_), None) => Err(AppError::invalid_field("to", "Both from and to are required")),
        (None, Some(_)) => Err(AppError::invalid_field("from", "Both from and to are required")),
        (None, None) => Ok(period_window(params.period.unwrap_or_default(), today)),
    }
}

fn period_window(period: DashboardPeriod, today: NaiveDate) -> DashboardWindow {
    let from = match period {
        DashboardPeriod::Last7Days => today - Duration::days(6),
        DashboardPeriod::Last30Days => today - Duration::days(29),
        DashboardPeriod::ThisMonth => today.with_day(1).unwrap_or(today),
        DashboardPeriod::ThisYear => today.with_ordinal(1).unwrap_or(today),
        DashboardPeriod::AllTime => {
            return DashboardWindow {
                range: None,
                previous: None,
            };
        }
    };
    DashboardWindow::bounded(DateRange { from, to: today })
}

/// Percentage change rounded to one decimal. `None` when the previous value
/// is zero and the current one is not.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return if current == 0.0 { Some(0.0) } else { None };
    }
    let change = (current - previous) / previous * 100.0;
    Some((change * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DashboardTotals {
    pub bookings: i64,
    /// Sum of successful booking prices
    pub revenue: f64,
    /// Distinct athletes with a booking in the window
    pub athletes: i64,
    /// Athletes registered in the window
    pub new_athletes: i64,
    /// Active bookings from today onwards
    pub upcoming_bookings: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardChanges {
    pub bookings: Option<f64>,
    pub revenue: Option<f64>,
    pub athletes: Option<f64>,
    pub new_athletes: Option<f64>,
}

impl DashboardChanges {
    pub fn between(current: &DashboardTotals, previous: Option<&DashboardTotals>) -> Self {
        let Some(previous) = previous else {
            return Self::default();
        };
        Self {
            bookings: percent_change(current.bookings as f64, previous.bookings as f64),
            revenue: percent_change(current.revenue, previous.revenue),
            athletes: percent_change(current.athletes as f64, previous.athletes as f64),
            new_athletes: percent_change(current.new_athletes as f64, previous.new_athletes as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub bookings: i64,
    pub revenue: f64,
}

/// Bookings grouped by program, location or sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Breakdown {
    pub id: Uuid,
    pub name: String,
    pub bookings: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatusCount {
    pub status: BookingStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub totals: DashboardTotals,
    pub changes: DashboardChanges,
    pub daily: Vec<DailyPoint>,
    pub by_program: Vec<Breakdown>,
    pub by_location: Vec<Breakdown>,
    pub by_sport: Vec<Breakdown>,
    pub by_status: Vec<StatusCount>,
}

/// Emits one point per day of `range`, zero-filling days with no bookings.
/// Without a range the points are returned as they are.
pub fn fill_days(range: Option<DateRange>, points: Vec<DailyPoint>) -> Vec<DailyPoint> {
    let Some(range) = range else {
        return points;
    };

    let mut points = points.into_iter().peekable();
    let mut filled = Vec::with_capacity(range.days().max(0) as usize);
    let mut day = range.from;
    while day <= range.to {
        while points.next_if(|p| p.date < day).is_some() {}
        match points.next_if(|p| p.date == day) {
            Some(point) => filled.push(point),
            None => filled.push(DailyPoint {
                date: day,
                bookings: 0,
                revenue: 0.0,
            }),
        }
        day += Duration::days(1);
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(period: DashboardPeriod) -> DashboardParams {
        DashboardParams {
            period: Some(period),
            ..Default::default()
        }
    }

    #[test]
    fn test_last_7_days_includes_today() {
        let window = resolve_window(&period(DashboardPeriod::Last7Days), date(2025, 9, 10)).unwrap();
        let range = window.range.unwrap();
        assert_eq!(range.from, date(2025, 9, 4));
        assert_eq!(range.days(), 7);
        assert_eq!(
            window.previous.unwrap(),
            DateRange {
                from: date(2025, 8, 28),
                to: date(2025, 9, 3)
            }
        );
    }

    #[test]
    fn test_default_period_is_last_30_days() {
        let window = resolve_window(&DashboardParams::default(), date(2025, 9, 30)).unwrap();
        assert_eq!(window.range.unwrap().from, date(2025, 9, 1));
    }

    #[test]
    fn test_this_month_and_year() {
        let today = date(2025, 3, 15);
        let month = resolve_window(&period(DashboardPeriod::ThisMonth), today).unwrap();
        assert_eq!(month.from_date(), Some(date(2025, 3, 1)));
        assert_eq!(month.previous.unwrap().from, date(2025, 2, 14));

        let year = resolve_window(&period(DashboardPeriod::ThisYear), today).unwrap();
        assert_eq!(year.from_date(), Some(date(2025, 1, 1)));
    }

    #[test]
    fn test_all_time_has_no_comparison() {
        let window = resolve_window(&period(DashboardPeriod::AllTime), date(2025, 9, 10)).unwrap();
        assert!(window.range.is_none());
        assert!(window.previous.is_none());
    }

    #[test]
    fn test_custom_range_wins_over_period() {
        let params = DashboardParams {
            period: Some(DashboardPeriod::ThisYear),
            from: Some(date(2025, 5, 1)),
            to: Some(date(2025, 5, 10)),
        };
        let window = resolve_window(&params, date(2025, 9, 10)).unwrap();
        assert_eq!(window.range.unwrap().days(), 10);
        assert_eq!(window.previous.unwrap().to, date(2025, 4, 30));
    }

    #[test]
    fn test_invalid_custom_ranges() {
        let today = date(2025, 9, 10);
        let half = DashboardParams {
            from: Some(date(2025, 5, 1)),
            ..Default::default()
        };
        assert_eq!(resolve_window(&half, today).unwrap_err().field.as_deref(), Some("to"));

        let backwards = DashboardParams {
            period: None,
            from: Some(date(2025, 5, 10)),
            to: Some(date(2025, 5, 1)),
        };
        assert!(resolve_window(&backwards, today).is_err());

        let too_long = DashboardParams {
            period: None,
            from: Some(date(2023, 1, 1)),
            to: Some(date(2025, 1, 1)),
        };
        assert!(resolve_window(&too_long, today).is_err());
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(150.0, 100.0), Some(50.0));
        assert_eq!(percent_change(50.0, 200.0), Some(-75.0));
        assert_eq!(percent_change(1.0, 3.0), Some(-66.7));
        assert_eq!(percent_change(0.0, 0.0), Some(0.0));
        assert_eq!(percent_change(10.0, 0.0), None);
    }

    #[test]
    fn test_changes_without_previous_are_empty() {
        let totals = DashboardTotals {
            bookings: 4,
            ..Default::default()
        };
        assert_eq!(DashboardChanges::between(&totals, None), DashboardChanges::default());
    }

    #[test]
    fn test_fill_days_zero_fills_gaps() {
        let range = DateRange {
            from: date(2025, 9, 1),
            to: date(2025, 9, 4),
        };
        let points = vec![
            DailyPoint {
                date: date(2025, 9, 2),
                bookings: 3,
                revenue: 300.0,
            },
            DailyPoint {
                date: date(2025, 9, 4),
                bookings: 1,
                revenue: 80.0,
            },
        ];
        let filled = fill_days(Some(range), points);
        assert_eq!(filled.len(), 4);
        assert_eq!(filled[0].bookings, 0);
        assert_eq!(filled[1].bookings, 3);
        assert_eq!(filled[2].revenue, 0.0);
        assert_eq!(filled[3].date, date(2025, 9, 4));
    }

    #[test]
    fn test_period_from_query_string() {
        let params: DashboardParams = serde_json::from_str(r#"{"period":"last_7_days"}"#).unwrap();
        assert_eq!(params.period, Some(DashboardPeriod::Last7Days));
    }
}
