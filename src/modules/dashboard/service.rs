use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use academix_cache::{RedisCache, cached, hash_filters, keys, ttl};
use academix_core::AppError;
use academix_models::AcademicId;
use academix_models::dashboard::StatusCount;

use super::model::{
    Breakdown, DailyPoint, DashboardChanges, DashboardParams, DashboardResponse, DashboardTotals,
    DashboardWindow, DateRange, fill_days, resolve_window,
};

/// Both bounds are optional; NULL leaves that side open.
const IN_RANGE: &str = "b.academic_id = $1 \
    AND ($2::date IS NULL OR b.date >= $2) \
    AND ($3::date IS NULL OR b.date <= $3)";

const REVENUE: &str =
    "COALESCE(SUM(b.price) FILTER (WHERE b.status = 'success'), 0)::float8 AS revenue";

#[derive(Clone, Copy)]
enum Dimension {
    Program,
    Location,
    Sport,
}

impl Dimension {
    fn columns(self) -> (&'static str, &'static str) {
        match self {
            Dimension::Program => ("p.id", "p.name"),
            Dimension::Location => ("l.id", "l.name"),
            Dimension::Sport => ("s.id", "s.name"),
        }
    }
}

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id))]
    pub async fn summary(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        params: DashboardParams,
    ) -> Result<DashboardResponse, AppError> {
        let window = resolve_window(&params, Utc::now().date_naive())?;
        let key = keys::dashboard::summary(academic_id.into_inner(), &hash_filters(&window));

        cached(cache, &key, ttl::DASHBOARD, || {
            Self::build(db, academic_id, window)
        })
        .await
    }

    async fn build(
        db: &PgPool,
        academic_id: AcademicId,
        window: DashboardWindow,
    ) -> Result<DashboardResponse, AppError> {
        let totals = Self::totals(db, academic_id, window.range).await?;
        let previous = match window.previous {
            Some(range) => Some(Self::totals(db, academic_id, Some(range)).await?),
            None => None,
        };
        let changes = DashboardChanges::between(&totals, previous.as_ref());

        let (from, to) = (window.from_date(), window.to_date());
        let daily = fill_days(window.range, Self::daily(db, academic_id, from, to).await?);
        let by_program = Self::breakdown(db, academic_id, from, to, Dimension::Program).await?;
        let by_location = Self::breakdown(db, academic_id, from, to, Dimension::Location).await?;
        let by_sport = Self::breakdown(db, academic_id, from, to, Dimension::Sport).await?;
        let by_status = Self::by_status(db, academic_id, from, to).await?;

        debug!(
            bookings = totals.bookings,
            revenue = totals.revenue,
            days = daily.len(),
            "Dashboard computed"
        );

        Ok(DashboardResponse {
            from,
            to,
            totals,
            changes,
            daily,
            by_program,
            by_location,
            by_sport,
            by_status,
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "bookings"))]
    async fn totals(
        db: &PgPool,
        academic_id: AcademicId,
        range: Option<DateRange>,
    ) -> Result<DashboardTotals, AppError> {
        let totals = sqlx::query_as::<_, DashboardTotals>(&format!(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bookings b WHERE {range}) AS bookings,
                (SELECT COALESCE(SUM(b.price), 0)::float8 FROM bookings b
                    WHERE {range} AND b.status = 'success') AS revenue,
                (SELECT COUNT(DISTINCT b.athlete_id) FROM bookings b WHERE {range}) AS athletes,
                (SELECT COUNT(*) FROM athletes a
                    WHERE a.academic_id = $1
                    AND ($2::date IS NULL OR a.created_at::date >= $2)
                    AND ($3::date IS NULL OR a.created_at::date <= $3)) AS new_athletes,
                (SELECT COUNT(*) FROM bookings b
                    WHERE b.academic_id = $1
                    AND b.status IN ('pending', 'success')
                    AND b.date >= CURRENT_DATE) AS upcoming_bookings
            "#,
            range = IN_RANGE
        ))
        .bind(academic_id)
        .bind(range.map(|r| r.from))
        .bind(range.map(|r| r.to))
        .fetch_one(db)
        .await?;

        Ok(totals)
    }

    async fn daily(
        db: &PgPool,
        academic_id: AcademicId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyPoint>, AppError> {
        let points = sqlx::query_as::<_, DailyPoint>(&format!(
            "SELECT b.date, COUNT(*) AS bookings, {} FROM bookings b \
             WHERE {} GROUP BY b.date ORDER BY b.date",
            REVENUE, IN_RANGE
        ))
        .bind(academic_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;

        Ok(points)
    }

    async fn breakdown(
        db: &PgPool,
        academic_id: AcademicId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        dimension: Dimension,
    ) -> Result<Vec<Breakdown>, AppError> {
        let (id, name) = dimension.columns();
        let rows = sqlx::query_as::<_, Breakdown>(&format!(
            r#"
            SELECT {id} AS id, {name} AS name, COUNT(b.id) AS bookings, {revenue}
            FROM bookings b
            JOIN packages pk ON pk.id = b.package_id
            JOIN programs p ON p.id = pk.program_id
            JOIN locations l ON l.id = p.location_id
            JOIN sports s ON s.id = p.sport_id
            WHERE {range}
            GROUP BY {id}, {name}
            ORDER BY bookings DESC, {name}
            "#,
            revenue = REVENUE,
            range = IN_RANGE
        ))
        .bind(academic_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    async fn by_status(
        db: &PgPool,
        academic_id: AcademicId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, StatusCount>(&format!(
            "SELECT b.status, COUNT(*) AS count FROM bookings b \
             WHERE {} GROUP BY b.status ORDER BY b.status",
            IN_RANGE
        ))
        .bind(academic_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }
}
