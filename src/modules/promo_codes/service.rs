use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::ValidationErrors;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::promo_codes::{check_promo_terms, generate_code, normalize_code};
use academix_models::{AcademicId, PromoCodeId};

use super::model::{
    CreatePromoCodeDto, GeneratedCode, PromoCode, PromoCodeFilterParams, PromoCodeWithUsage,
    UpdatePromoCodeDto,
};
use crate::utils::db::{bulk_delete, push_page, push_search, write_error};

const ENTITY: &str = "promo_codes";
const COLUMNS: &str = "pc.id, pc.academic_id, pc.code, pc.discount_type, pc.discount_value, \
                       pc.start_date, pc.end_date, pc.created_at, pc.updated_at";
const DUPLICATE: &str = "This promo code already exists";
const GENERATE_ATTEMPTS: usize = 10;

pub struct PromoCodeService;

impl PromoCodeService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "promo_codes"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        filters: PromoCodeFilterParams,
    ) -> Result<Paginated<PromoCodeWithUsage>, AppError> {
        let key = keys::academy::list(academic_id.into_inner(), ENTITY, &hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || {
            Self::query_list(db, academic_id, &filters)
        })
        .await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &PromoCodeFilterParams) {
        push_search(query, "pc.code", &filters.code);
        if filters.active_only == Some(true) {
            query.push(" AND NOW() BETWEEN pc.start_date AND pc.end_date");
        }
    }

    async fn query_list(
        db: &PgPool,
        academic_id: AcademicId,
        filters: &PromoCodeFilterParams,
    ) -> Result<Paginated<PromoCodeWithUsage>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM promo_codes pc WHERE pc.academic_id = ",
        );
        count.push_bind(academic_id);
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, \
             (SELECT COUNT(*) FROM bookings b WHERE b.promo_code_id = pc.id) AS times_used \
             FROM promo_codes pc WHERE pc.academic_id = ",
            COLUMNS
        ));
        query.push_bind(academic_id);
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY pc.end_date DESC, pc.code");
        push_page(&mut query, &filters.pagination);
        let codes = query
            .build_query_as::<PromoCodeWithUsage>()
            .fetch_all(db)
            .await?;

        debug!(total, returned = codes.len(), "Promo codes fetched");

        Ok(Paginated {
            data: codes,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "promo_codes"))]
    pub async fn get(
        db: &PgPool,
        academic_id: AcademicId,
        id: PromoCodeId,
    ) -> Result<PromoCodeWithUsage, AppError> {
        sqlx::query_as::<_, PromoCodeWithUsage>(&format!(
            "SELECT {}, \
             (SELECT COUNT(*) FROM bookings b WHERE b.promo_code_id = pc.id) AS times_used \
             FROM promo_codes pc WHERE pc.id = $1 AND pc.academic_id = $2",
            COLUMNS
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Promo code not found")))
    }

    /// Looks a code up the way a customer types it.
    pub(crate) async fn find_by_code<'e, E>(
        executor: E,
        academic_id: AcademicId,
        code: &str,
    ) -> Result<PromoCode, AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PromoCode>(&format!(
            "SELECT {} FROM promo_codes pc WHERE pc.academic_id = $1 AND pc.code = $2",
            COLUMNS
        ))
        .bind(academic_id)
        .bind(normalize_code(code))
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::invalid_field("promo_code", "Promo code not found"))
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "INSERT", db.table = "promo_codes"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: CreatePromoCodeDto,
    ) -> Result<PromoCodeWithUsage, AppError> {
        let code = normalize_code(&dto.code);

        let id: PromoCodeId = sqlx::query_scalar(
            "INSERT INTO promo_codes \
             (academic_id, code, discount_type, discount_value, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(academic_id)
        .bind(&code)
        .bind(dto.discount_type)
        .bind(dto.discount_value)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(db)
        .await
        .map_err(|e| write_error(e, "code", DUPLICATE))?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(promo_code.id = %id, promo_code.code = %code, "Promo code created");

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "promo_codes"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: PromoCodeId,
        dto: UpdatePromoCodeDto,
    ) -> Result<PromoCodeWithUsage, AppError> {
        let existing = Self::get(db, academic_id, id).await?.promo_code;

        let code = dto
            .code
            .as_deref()
            .map(normalize_code)
            .unwrap_or(existing.code);
        let discount_type = dto.discount_type.unwrap_or(existing.discount_type);
        let discount_value = dto.discount_value.unwrap_or(existing.discount_value);
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);

        check_promo_terms(discount_type, discount_value, start_date, end_date).map_err(|err| {
            let mut errors = ValidationErrors::new();
            errors.add("__all__", err);
            AppError::from_validation(&errors)
        })?;

        sqlx::query(
            "UPDATE promo_codes SET code = $1, discount_type = $2, discount_value = $3, \
             start_date = $4, end_date = $5, updated_at = NOW() WHERE id = $6",
        )
        .bind(&code)
        .bind(discount_type)
        .bind(discount_value)
        .bind(start_date)
        .bind(end_date)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| write_error(e, "code", DUPLICATE))?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(promo_code.id = %id, "Promo code updated");

        Self::get(db, academic_id, id).await
    }

    /// Bookings that used the code keep their price; the link is cleared.
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "DELETE", db.table = "promo_codes"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: PromoCodeId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM promo_codes WHERE id = $1 AND academic_id = $2")
            .bind(id)
            .bind(academic_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Promo code not found")));
        }

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(promo_code.id = %id, "Promo code deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(academic.id = %academic_id, count = ids.len(), db.operation = "DELETE", db.table = "promo_codes"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, "promo_codes", &ids, Some(academic_id)).await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(deleted, "Promo codes deleted");

        Ok(deleted)
    }

    /// Suggests a random code the academic has not used yet.
    #[instrument(skip(db), fields(academic.id = %academic_id))]
    pub async fn generate(db: &PgPool, academic_id: AcademicId) -> Result<GeneratedCode, AppError> {
        for _ in 0..GENERATE_ATTEMPTS {
            let code = generate_code(&mut rand::thread_rng());

            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM promo_codes WHERE academic_id = $1 AND code = $2)",
            )
            .bind(academic_id)
            .bind(&code)
            .fetch_one(db)
            .await?;

            if !taken {
                return Ok(GeneratedCode { code });
            }
            warn!(promo_code.code = %code, "Generated promo code already taken, retrying");
        }

        Err(AppError::internal_error("Could not generate an unused promo code"))
    }
}
