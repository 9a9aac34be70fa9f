use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated, hash_password};
use academix_models::academics::{slug_candidate, slugify};
use academix_models::{AcademicId, AcademicStatus, Role, SportId};

use super::model::{
    Academic, AcademicCounts, AcademicDetail, AcademicFilterParams, CreateAcademicDto,
    UpdateAcademicDto,
};
use crate::metrics::track_academic_created;
use crate::utils::db::{
    bulk_delete, ensure_rows_exist, push_page, push_search, replace_links, to_uuids, write_error,
};

const COLUMNS: &str = "id, name, slug, description, logo, entry_fees, policy, status, \
                       onboarded, created_at, updated_at";

pub struct AcademicService;

impl AcademicService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "academics"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        filters: AcademicFilterParams,
    ) -> Result<Paginated<Academic>, AppError> {
        let key = keys::academics::list(&hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || Self::query_list(db, &filters)).await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &AcademicFilterParams) {
        push_search(query, "name", &filters.name);
        if let Some(status) = filters.status {
            query.push(" AND status = ").push_bind(status);
        }
    }

    async fn query_list(
        db: &PgPool,
        filters: &AcademicFilterParams,
    ) -> Result<Paginated<Academic>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM academics WHERE 1=1");
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM academics WHERE 1=1", COLUMNS));
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY created_at DESC");
        push_page(&mut query, &filters.pagination);
        let academics = query.build_query_as::<Academic>().fetch_all(db).await?;

        debug!(total, returned = academics.len(), "Academics fetched");

        Ok(Paginated {
            data: academics,
            meta: filters.pagination.meta(total),
        })
    }

    pub(crate) async fn find(db: &PgPool, id: AcademicId) -> Result<Academic, AppError> {
        sqlx::query_as::<_, Academic>(&format!("SELECT {} FROM academics WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic not found")))
    }

    /// The academic with its sport ids and row counts.
    pub(crate) async fn detail(db: &PgPool, id: AcademicId) -> Result<AcademicDetail, AppError> {
        let academic = Self::find(db, id).await?;

        let sport_ids = sqlx::query_scalar::<_, SportId>(
            "SELECT sport_id FROM academic_sports WHERE academic_id = $1 ORDER BY sport_id",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let counts = sqlx::query_as::<_, AcademicCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM locations WHERE academic_id = $1) AS locations_count,
                (SELECT COUNT(*) FROM coaches WHERE academic_id = $1) AS coaches_count,
                (SELECT COUNT(*) FROM programs WHERE academic_id = $1) AS programs_count,
                (SELECT COUNT(*) FROM athletes WHERE academic_id = $1) AS athletes_count
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(AcademicDetail {
            academic,
            sport_ids,
            locations_count: counts.locations_count,
            coaches_count: counts.coaches_count,
            programs_count: counts.programs_count,
            athletes_count: counts.athletes_count,
        })
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "academics"))]
    pub async fn get(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: AcademicId,
    ) -> Result<AcademicDetail, AppError> {
        let key = keys::academics::by_id(id.into_inner());
        cached(cache, &key, ttl::DETAIL, || Self::detail(db, id)).await
    }

    /// First `base`, `base-2`, `base-3`, ... not yet taken.
    async fn free_slug(conn: &mut PgConnection, name: &str) -> Result<String, AppError> {
        let base = slugify(name);
        let taken: Vec<String> =
            sqlx::query_scalar("SELECT slug FROM academics WHERE slug = $1 OR slug LIKE $2")
                .bind(&base)
                .bind(format!("{}-%", base))
                .fetch_all(&mut *conn)
                .await?;

        let mut attempt = 1;
        loop {
            let candidate = slug_candidate(&base, attempt);
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }

    /// Replaces the academic's sports with `sport_ids`.
    pub(crate) async fn replace_sports(
        conn: &mut PgConnection,
        academic_id: AcademicId,
        sport_ids: &[SportId],
    ) -> Result<(), AppError> {
        replace_links(
            conn,
            "academic_sports",
            "academic_id",
            academic_id.into_inner(),
            "sport_id",
            &to_uuids(sport_ids),
        )
        .await
    }

    /// Creates the academic and its admin account in one transaction.
    #[instrument(skip(db, cache, dto), fields(academic.name = %dto.name, db.operation = "INSERT", db.table = "academics"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: CreateAcademicDto,
    ) -> Result<AcademicDetail, AppError> {
        ensure_rows_exist(db, "sports", &to_uuids(&dto.sport_ids), None, "sport_ids").await?;
        let password_hash = hash_password(&dto.admin_password)?;

        let mut tx = db.begin().await?;

        let name = dto.name.trim();
        let slug = Self::free_slug(&mut tx, name).await?;

        let id: AcademicId = sqlx::query_scalar(
            "INSERT INTO academics (name, slug, description, entry_fees) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.entry_fees.unwrap_or(0.0))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "name", "An academic with this name already exists"))?;

        Self::replace_sports(&mut tx, id, &dto.sport_ids).await?;

        sqlx::query(
            "INSERT INTO users (name, email, password, role, academic_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(dto.admin_name.trim())
        .bind(dto.admin_email.trim().to_lowercase())
        .bind(&password_hash)
        .bind(Role::AcademicAdmin)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "admin_email", "An account with this email already exists"))?;

        tx.commit().await?;

        invalidate::academic(cache, None, false).await;
        track_academic_created();
        info!(academic.id = %id, academic.slug = %slug, "Academic created");

        Self::detail(db, id).await
    }

    /// Applies a partial profile update; shared with the academy's own
    /// profile endpoint.
    pub(crate) async fn apply_update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: AcademicId,
        dto: UpdateAcademicDto,
    ) -> Result<AcademicDetail, AppError> {
        let existing = Self::find(db, id).await?;

        if let Some(sport_ids) = &dto.sport_ids {
            ensure_rows_exist(db, "sports", &to_uuids(sport_ids), None, "sport_ids").await?;
        }

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let description = dto.description.or(existing.description);
        let logo = dto.logo.or(existing.logo);
        let entry_fees = dto.entry_fees.unwrap_or(existing.entry_fees);
        let policy = dto.policy.or(existing.policy);

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE academics SET name = $1, description = $2, logo = $3, entry_fees = $4, \
             policy = $5, updated_at = NOW() WHERE id = $6",
        )
        .bind(&name)
        .bind(&description)
        .bind(&logo)
        .bind(entry_fees)
        .bind(&policy)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(sport_ids) = &dto.sport_ids {
            Self::replace_sports(&mut tx, id, sport_ids).await?;
        }

        tx.commit().await?;

        invalidate::academic(cache, Some(id.into_inner()), false).await;
        info!(academic.id = %id, "Academic updated");

        Self::detail(db, id).await
    }

    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "academics"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: AcademicId,
        dto: UpdateAcademicDto,
    ) -> Result<AcademicDetail, AppError> {
        Self::apply_update(db, cache, id, dto).await
    }

    #[instrument(skip(db, cache), fields(db.operation = "UPDATE", db.table = "academics"))]
    pub async fn update_status(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: AcademicId,
        status: AcademicStatus,
    ) -> Result<Academic, AppError> {
        let academic = sqlx::query_as::<_, Academic>(&format!(
            "UPDATE academics SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            COLUMNS
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic not found")))?;

        invalidate::academic(cache, Some(id.into_inner()), false).await;
        info!(academic.id = %id, academic.status = %status, "Academic status changed");

        Ok(academic)
    }

    /// Deletes the academic; its users and data go with it.
    #[instrument(skip(db, cache), fields(db.operation = "DELETE", db.table = "academics"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: AcademicId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM academics WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Academic not found")));
        }

        invalidate::academic(cache, Some(id.into_inner()), true).await;
        info!(academic.id = %id, "Academic deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(count = ids.len(), db.operation = "DELETE", db.table = "academics"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, "academics", &ids, None).await?;

        for id in &ids {
            invalidate::academic(cache, Some(*id), true).await;
        }
        info!(deleted, "Academics deleted");

        Ok(deleted)
    }
}
