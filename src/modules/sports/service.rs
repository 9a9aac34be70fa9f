use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::SportId;

use super::model::{CreateSportDto, ReferenceFilterParams, Sport, UpdateSportDto};
use crate::utils::db::{bulk_delete, delete_error, push_page, push_search, write_error};

const TABLE: &str = "sports";
const COLUMNS: &str = "id, name, image, created_at, updated_at";
const DUPLICATE: &str = "A sport with this name already exists";

pub struct SportService;

impl SportService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "sports"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        filters: ReferenceFilterParams,
    ) -> Result<Paginated<Sport>, AppError> {
        let key = keys::reference::list(TABLE, &hash_filters(&filters));
        cached(cache, &key, ttl::REFERENCE, || Self::query_list(db, &filters)).await
    }

    async fn query_list(
        db: &PgPool,
        filters: &ReferenceFilterParams,
    ) -> Result<Paginated<Sport>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sports WHERE 1=1");
        push_search(&mut count, "name", &filters.name);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM sports WHERE 1=1",
            COLUMNS
        ));
        push_search(&mut query, "name", &filters.name);
        query.push(" ORDER BY name");
        push_page(&mut query, &filters.pagination);
        let sports = query.build_query_as::<Sport>().fetch_all(db).await?;

        debug!(total, returned = sports.len(), "Sports fetched");

        Ok(Paginated {
            data: sports,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "sports"))]
    pub async fn get(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: SportId,
    ) -> Result<Sport, AppError> {
        let key = keys::reference::by_id(TABLE, id.into_inner());
        cached(cache, &key, ttl::REFERENCE, || async move {
            sqlx::query_as::<_, Sport>(&format!("SELECT {} FROM sports WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Sport not found")))
        })
        .await
    }

    #[instrument(skip(db, cache, dto), fields(sport.name = %dto.name, db.operation = "INSERT", db.table = "sports"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: CreateSportDto,
    ) -> Result<Sport, AppError> {
        let sport = sqlx::query_as::<_, Sport>(&format!(
            "INSERT INTO sports (name, image) VALUES ($1, $2) RETURNING {}",
            COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(&dto.image)
        .fetch_one(db)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?;

        invalidate::reference(cache, TABLE, &[]).await;
        info!(sport.id = %sport.id, "Sport created");

        Ok(sport)
    }

    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "sports"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: SportId,
        dto: UpdateSportDto,
    ) -> Result<Sport, AppError> {
        let existing = Self::get(db, None, id).await?;

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let image = dto.image.or(existing.image);

        let sport = sqlx::query_as::<_, Sport>(&format!(
            "UPDATE sports SET name = $1, image = $2, updated_at = NOW() WHERE id = $3 RETURNING {}",
            COLUMNS
        ))
        .bind(&name)
        .bind(&image)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?;

        invalidate::reference(cache, TABLE, &[id.into_inner()]).await;
        info!(sport.id = %id, "Sport updated");

        Ok(sport)
    }

    #[instrument(skip(db, cache), fields(db.operation = "DELETE", db.table = "sports"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: SportId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sports WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| delete_error(e, "Sport"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Sport not found")));
        }

        invalidate::reference(cache, TABLE, &[id.into_inner()]).await;
        info!(sport.id = %id, "Sport deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(count = ids.len(), db.operation = "DELETE", db.table = "sports"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, TABLE, &ids, None).await?;

        invalidate::reference(cache, TABLE, &ids).await;
        info!(deleted, "Sports deleted");

        Ok(deleted)
    }
}
