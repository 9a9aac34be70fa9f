pub use academix_models::dashboard::{
    Breakdown, DailyPoint, DashboardChanges, DashboardParams, DashboardResponse, DashboardTotals,
    DashboardWindow, DateRange, fill_days, resolve_window,
};
