use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::{CityId, CountryId};

use super::model::{City, CityFilterParams, CreateCityDto, UpdateCityDto};
use crate::utils::db::{bulk_delete, ensure_rows_exist, push_page, push_search, write_error};

const TABLE: &str = "cities";
const SELECT: &str = "SELECT c.id, c.name, c.country_id, co.name AS country_name, \
                      c.created_at, c.updated_at \
                      FROM cities c JOIN countries co ON co.id = c.country_id";
const DUPLICATE: &str = "A city with this name already exists in this country";

pub struct CityService;

impl CityService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "cities"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        filters: CityFilterParams,
    ) -> Result<Paginated<City>, AppError> {
        let key = keys::reference::list(TABLE, &hash_filters(&filters));
        cached(cache, &key, ttl::REFERENCE, || Self::query_list(db, &filters)).await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &CityFilterParams) {
        push_search(query, "c.name", &filters.name);
        if let Some(country_id) = filters.country_id {
            query.push(" AND c.country_id = ").push_bind(country_id);
        }
    }

    async fn query_list(
        db: &PgPool,
        filters: &CityFilterParams,
    ) -> Result<Paginated<City>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cities c WHERE 1=1");
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("{} WHERE 1=1", SELECT));
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY co.name, c.name");
        push_page(&mut query, &filters.pagination);
        let cities = query.build_query_as::<City>().fetch_all(db).await?;

        debug!(total, returned = cities.len(), "Cities fetched");

        Ok(Paginated {
            data: cities,
            meta: filters.pagination.meta(total),
        })
    }

    async fn find(db: &PgPool, id: CityId) -> Result<City, AppError> {
        sqlx::query_as::<_, City>(&format!("{} WHERE c.id = $1", SELECT))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("City not found")))
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "cities"))]
    pub async fn get(db: &PgPool, cache: Option<&RedisCache>, id: CityId) -> Result<City, AppError> {
        let key = keys::reference::by_id(TABLE, id.into_inner());
        cached(cache, &key, ttl::REFERENCE, || Self::find(db, id)).await
    }

    async fn ensure_country(db: &PgPool, country_id: CountryId) -> Result<(), AppError> {
        ensure_rows_exist(db, "countries", &[country_id.into_inner()], None, "country_id").await
    }

    #[instrument(skip(db, cache, dto), fields(city.name = %dto.name, db.operation = "INSERT", db.table = "cities"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: CreateCityDto,
    ) -> Result<City, AppError> {
        Self::ensure_country(db, dto.country_id).await?;

        let id: CityId = sqlx::query_scalar(
            "INSERT INTO cities (name, country_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(dto.name.trim())
        .bind(dto.country_id)
        .fetch_one(db)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?;

        invalidate::reference(cache, TABLE, &[]).await;
        info!(city.id = %id, country.id = %dto.country_id, "City created");

        Self::find(db, id).await
    }

    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "cities"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: CityId,
        dto: UpdateCityDto,
    ) -> Result<City, AppError> {
        let existing = Self::find(db, id).await?;

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let country_id = match dto.country_id {
            Some(country_id) => {
                Self::ensure_country(db, country_id).await?;
                country_id
            }
            None => existing.country_id,
        };

        sqlx::query("UPDATE cities SET name = $1, country_id = $2, updated_at = NOW() WHERE id = $3")
            .bind(&name)
            .bind(country_id)
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| write_error(e, "name", DUPLICATE))?;

        invalidate::reference(cache, TABLE, &[id.into_inner()]).await;
        info!(city.id = %id, "City updated");

        Self::find(db, id).await
    }

    #[instrument(skip(db, cache), fields(db.operation = "DELETE", db.table = "cities"))]
    pub async fn delete(db: &PgPool, cache: Option<&RedisCache>, id: CityId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("City not found")));
        }

        invalidate::reference(cache, TABLE, &[id.into_inner()]).await;
        info!(city.id = %id, "City deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(count = ids.len(), db.operation = "DELETE", db.table = "cities"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, TABLE, &ids, None).await?;

        invalidate::reference(cache, TABLE, &ids).await;
        info!(deleted, "Cities deleted");

        Ok(deleted)
    }
}
