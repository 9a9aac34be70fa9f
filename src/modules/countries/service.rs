use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::{CountryId, reference::NameDto};

use super::model::{ReferenceFilterParams, Country};
use crate::utils::db::{bulk_delete, delete_error, push_page, push_search, write_error};

const TABLE: &str = "countries";
const COLUMNS: &str = "id, name, created_at, updated_at";
const DUPLICATE: &str = "A country with this name already exists";

pub struct CountryService;

impl CountryService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "countries"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        filters: ReferenceFilterParams,
    ) -> Result<Paginated<Country>, AppError> {
        let key = keys::reference::list(TABLE, &hash_filters(&filters));
        cached(cache, &key, ttl::REFERENCE, || Self::query_list(db, &filters)).await
    }

    async fn query_list(
        db: &PgPool,
        filters: &ReferenceFilterParams,
    ) -> Result<Paginated<Country>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM countries WHERE 1=1");
        push_search(&mut count, "name", &filters.name);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM countries WHERE 1=1", COLUMNS));
        push_search(&mut query, "name", &filters.name);
        query.push(" ORDER BY name");
        push_page(&mut query, &filters.pagination);
        let rows = query.build_query_as::<Country>().fetch_all(db).await?;

        debug!(total, returned = rows.len(), "Countries fetched");

        Ok(Paginated {
            data: rows,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "countries"))]
    pub async fn get(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: CountryId,
    ) -> Result<Country, AppError> {
        let key = keys::reference::by_id(TABLE, id.into_inner());
        cached(cache, &key, ttl::REFERENCE, || async move {
            sqlx::query_as::<_, Country>(&format!("SELECT {} FROM countries WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Country not found")))
        })
        .await
    }

    #[instrument(skip(db, cache, dto), fields(country.name = %dto.name, db.operation = "INSERT", db.table = "countries"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: NameDto,
    ) -> Result<Country, AppError> {
        let row = sqlx::query_as::<_, Country>(&format!(
            "INSERT INTO countries (name) VALUES ($1) RETURNING {}",
            COLUMNS
        ))
        .bind(dto.name.trim())
        .fetch_one(db)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?;

        invalidate::reference(cache, TABLE, &[]).await;
        info!(country.id = %row.id, "Country created");

        Ok(row)
    }

    /// Renames a row; `name` is the only editable column.
    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "countries"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: CountryId,
        dto: NameDto,
    ) -> Result<Country, AppError> {
        let row = sqlx::query_as::<_, Country>(&format!(
            "UPDATE countries SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Country not found")))?;

        invalidate::reference(cache, TABLE, &[id.into_inner()]).await;
        invalidate::reference(cache, "cities", &[]).await;
        info!(country.id = %id, "Country updated");

        Ok(row)
    }

    #[instrument(skip(db, cache), fields(db.operation = "DELETE", db.table = "countries"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: CountryId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM countries WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| delete_error(e, "Country"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Country not found")));
        }

        invalidate::reference(cache, TABLE, &[id.into_inner()]).await;
        // Cities go with their country
        invalidate::reference(cache, "cities", &[]).await;
        info!(country.id = %id, "Country deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(count = ids.len(), db.operation = "DELETE", db.table = "countries"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, TABLE, &ids, None).await?;

        invalidate::reference(cache, TABLE, &ids).await;
        // Cities go with their country
        invalidate::reference(cache, "cities", &[]).await;
        info!(deleted, "Countries deleted");

        Ok(deleted)
    }
}
