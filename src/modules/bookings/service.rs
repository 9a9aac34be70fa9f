use axum::http::StatusCode;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::bookings::{check_bookable, group_by_date, quote_price};
use academix_models::{AcademicId, BookingId, BookingStatus};

use super::model::{
    BookingDetail, BookingFilterParams, CalendarParams, CalendarResponse, CreateBookingDto,
};
use crate::metrics::{track_booking_created, track_promo_code_redeemed};
use crate::modules::programs::service::PackageService;
use crate::modules::promo_codes::service::PromoCodeService;
use crate::utils::db::{ensure_rows_exist, push_page};

const ENTITY: &str = "bookings";
const SELECT: &str = r#"
    SELECT b.id, b.academic_id, b.athlete_id, b.package_id, b.date, b.time, b.price, b.status,
           b.promo_code_id, b.created_at, b.updated_at,
           a.first_name || ' ' || a.last_name AS athlete_name,
           p.id AS program_id, p.name AS program_name,
           pk.name AS package_name,
           l.id AS location_id, l.name AS location_name,
           s.name AS sport_name
    FROM bookings b
    JOIN athletes a ON a.id = b.athlete_id
    JOIN packages pk ON pk.id = b.package_id
    JOIN programs p ON p.id = pk.program_id
    JOIN locations l ON l.id = p.location_id
    JOIN sports s ON s.id = p.sport_id
"#;
const FROM_JOINS: &str = r#"
    FROM bookings b
    JOIN packages pk ON pk.id = b.package_id
    JOIN programs p ON p.id = pk.program_id
"#;

pub struct BookingService;

impl BookingService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "bookings"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        filters: BookingFilterParams,
    ) -> Result<Paginated<BookingDetail>, AppError> {
        let key = keys::academy::list(academic_id.into_inner(), ENTITY, &hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || {
            Self::query_list(db, academic_id, &filters)
        })
        .await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &BookingFilterParams) {
        if let Some(status) = filters.status {
            query.push(" AND b.status = ").push_bind(status);
        }
        if let Some(program_id) = filters.program_id {
            query.push(" AND p.id = ").push_bind(program_id);
        }
        if let Some(location_id) = filters.location_id {
            query.push(" AND p.location_id = ").push_bind(location_id);
        }
        if let Some(from) = filters.from {
            query.push(" AND b.date >= ").push_bind(from);
        }
        if let Some(to) = filters.to {
            query.push(" AND b.date <= ").push_bind(to);
        }
    }

    async fn query_list(
        db: &PgPool,
        academic_id: AcademicId,
        filters: &BookingFilterParams,
    ) -> Result<Paginated<BookingDetail>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) {} WHERE b.academic_id = ",
            FROM_JOINS
        ));
        count.push_bind(academic_id);
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("{} WHERE b.academic_id = ", SELECT));
        query.push_bind(academic_id);
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY b.date DESC, b.time DESC, b.id");
        push_page(&mut query, &filters.pagination);
        let bookings = query.build_query_as::<BookingDetail>().fetch_all(db).await?;

        debug!(total, returned = bookings.len(), "Bookings fetched");

        Ok(Paginated {
            data: bookings,
            meta: filters.pagination.meta(total),
        })
    }

    /// Bookings between `from` and `to` (inclusive), grouped by day.
    #[instrument(skip(db), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "bookings"))]
    pub async fn calendar(
        db: &PgPool,
        academic_id: AcademicId,
        params: CalendarParams,
    ) -> Result<CalendarResponse, AppError> {
        params.validate_range()?;

        let bookings = sqlx::query_as::<_, BookingDetail>(&format!(
            "{} WHERE b.academic_id = $1 AND b.date BETWEEN $2 AND $3 ORDER BY b.date, b.time",
            SELECT
        ))
        .bind(academic_id)
        .bind(params.from)
        .bind(params.to)
        .fetch_all(db)
        .await?;

        debug!(count = bookings.len(), "Calendar bookings fetched");

        Ok(CalendarResponse {
            from: params.from,
            to: params.to,
            days: group_by_date(bookings),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "bookings"))]
    pub async fn get(
        db: &PgPool,
        academic_id: AcademicId,
        id: BookingId,
    ) -> Result<BookingDetail, AppError> {
        sqlx::query_as::<_, BookingDetail>(&format!(
            "{} WHERE b.id = $1 AND b.academic_id = $2",
            SELECT
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Booking not found")))
    }

    /// Prices and stores a pending booking. The package row is locked while
    /// its seats are counted, and the athlete row while the first booking is
    /// decided.
    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "INSERT", db.table = "bookings"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: CreateBookingDto,
    ) -> Result<BookingDetail, AppError> {
        let mut tx = db.begin().await?;

        ensure_rows_exist(
            &mut *tx,
            "athletes",
            &[dto.athlete_id.into_inner()],
            Some(academic_id),
            "athlete_id",
        )
        .await?;

        let package = PackageService::find(&mut *tx, academic_id, dto.package_id)
            .await
            .map_err(|e| {
                if e.status == StatusCode::NOT_FOUND {
                    AppError::invalid_field("package_id", "Package not found")
                } else {
                    e
                }
            })?;

        sqlx::query("SELECT id FROM packages WHERE id = $1 FOR UPDATE")
            .bind(package.id)
            .execute(&mut *tx)
            .await?;

        let active_bookings: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE package_id = $1 AND status IN ('pending', 'success')",
        )
        .bind(package.id)
        .fetch_one(&mut *tx)
        .await?;

        check_bookable(&package, dto.date, active_bookings)?;

        // Serializes bookings per athlete so entry fees are charged once.
        sqlx::query("SELECT id FROM athletes WHERE id = $1 AND academic_id = $2 FOR UPDATE")
            .bind(dto.athlete_id)
            .bind(academic_id)
            .execute(&mut *tx)
            .await?;

        let first_booking: bool = sqlx::query_scalar(
            "SELECT NOT EXISTS(SELECT 1 FROM bookings \
             WHERE athlete_id = $1 AND status IN ('pending', 'success'))",
        )
        .bind(dto.athlete_id)
        .fetch_one(&mut *tx)
        .await?;

        let academic_entry_fees: f64 =
            sqlx::query_scalar("SELECT entry_fees FROM academics WHERE id = $1")
                .bind(academic_id)
                .fetch_one(&mut *tx)
                .await?;

        let promo = match dto.promo_code.as_deref() {
            Some(code) => Some(PromoCodeService::find_by_code(&mut *tx, academic_id, code).await?),
            None => None,
        };

        let quote = quote_price(
            &package,
            academic_entry_fees,
            first_booking,
            promo.as_ref(),
            Utc::now(),
        )?;

        let id: BookingId = sqlx::query_scalar(
            "INSERT INTO bookings (academic_id, athlete_id, package_id, date, time, price, status, promo_code_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(academic_id)
        .bind(dto.athlete_id)
        .bind(package.id)
        .bind(dto.date)
        .bind(dto.time)
        .bind(quote.total)
        .bind(BookingStatus::Pending)
        .bind(promo.as_ref().map(|p| p.id))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        track_booking_created(BookingStatus::Pending);
        if let Some(promo) = &promo {
            track_promo_code_redeemed(promo.discount_type);
        }
        Self::invalidate(cache, academic_id).await;
        info!(
            booking.id = %id,
            booking.price = quote.total,
            booking.discount = quote.discount,
            booking.entry_fees = quote.entry_fees,
            "Booking created"
        );

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "bookings"))]
    pub async fn update_status(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<BookingDetail, AppError> {
        let current: BookingStatus =
            sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1 AND academic_id = $2")
                .bind(id)
                .bind(academic_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Booking not found")))?;

        if !current.can_transition_to(status) {
            return Err(AppError::conflict(format!(
                "A {} booking cannot become {}",
                current, status
            ))
            .with_field("status"));
        }

        // Guarded on the old status so a concurrent change loses cleanly.
        let result = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
        )
        .bind(status)
        .bind(id)
        .bind(current)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict("Booking was changed by someone else").with_field("status"));
        }

        Self::invalidate(cache, academic_id).await;
        info!(booking.id = %id, from = %current, to = %status, "Booking status changed");

        Self::get(db, academic_id, id).await
    }

    async fn invalidate(cache: Option<&RedisCache>, academic_id: AcademicId) {
        let academic_id = academic_id.into_inner();
        invalidate::academy_entity(cache, academic_id, ENTITY).await;
        invalidate::academy_entity(cache, academic_id, "athletes").await;
        invalidate::academy_entity(cache, academic_id, "promo_codes").await;
        invalidate::dashboard(cache, academic_id).await;
    }
}
