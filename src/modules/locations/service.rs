use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::{AcademicId, AmenityId, LocationId, SportId};

use super::model::{CreateLocationDto, LocationDetail, LocationFilterParams, UpdateLocationDto};
use crate::utils::db::{
    bulk_delete, delete_error, ensure_rows_exist, push_page, push_search, replace_links,
    to_uuids, write_error,
};

const ENTITY: &str = "locations";
const SELECT: &str = r#"
    SELECT l.id, l.academic_id, l.name, l.name_in_google_map, l.url, l.city_id, l.is_default,
           l.created_at, l.updated_at,
           ci.name AS city_name,
           ARRAY(SELECT ls.sport_id FROM location_sports ls
                 WHERE ls.location_id = l.id ORDER BY ls.sport_id) AS sport_ids,
           ARRAY(SELECT la.amenity_id FROM location_amenities la
                 WHERE la.location_id = l.id ORDER BY la.amenity_id) AS amenity_ids
    FROM locations l
    LEFT JOIN cities ci ON ci.id = l.city_id
"#;
const DUPLICATE: &str = "A location with this name already exists";

pub struct LocationService;

impl LocationService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "locations"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        filters: LocationFilterParams,
    ) -> Result<Paginated<LocationDetail>, AppError> {
        let key = keys::academy::list(academic_id.into_inner(), ENTITY, &hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || {
            Self::query_list(db, academic_id, &filters)
        })
        .await
    }

    async fn query_list(
        db: &PgPool,
        academic_id: AcademicId,
        filters: &LocationFilterParams,
    ) -> Result<Paginated<LocationDetail>, AppError> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM locations l WHERE l.academic_id = ");
        count.push_bind(academic_id);
        push_search(&mut count, "l.name", &filters.name);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("{} WHERE l.academic_id = ", SELECT));
        query.push_bind(academic_id);
        push_search(&mut query, "l.name", &filters.name);
        query.push(" ORDER BY l.is_default DESC, l.name");
        push_page(&mut query, &filters.pagination);
        let locations = query.build_query_as::<LocationDetail>().fetch_all(db).await?;

        debug!(total, returned = locations.len(), "Locations fetched");

        Ok(Paginated {
            data: locations,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "locations"))]
    pub async fn get(
        db: &PgPool,
        academic_id: AcademicId,
        id: LocationId,
    ) -> Result<LocationDetail, AppError> {
        sqlx::query_as::<_, LocationDetail>(&format!(
            "{} WHERE l.id = $1 AND l.academic_id = $2",
            SELECT
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Location not found")))
    }

    async fn check_links(
        db: &PgPool,
        city_id: Option<Uuid>,
        sport_ids: Option<&[SportId]>,
        amenity_ids: Option<&[AmenityId]>,
    ) -> Result<(), AppError> {
        if let Some(city_id) = city_id {
            ensure_rows_exist(db, "cities", &[city_id], None, "city_id").await?;
        }
        if let Some(sport_ids) = sport_ids {
            ensure_rows_exist(db, "sports", &to_uuids(sport_ids), None, "sport_ids").await?;
        }
        if let Some(amenity_ids) = amenity_ids {
            ensure_rows_exist(db, "amenities", &to_uuids(amenity_ids), None, "amenity_ids")
                .await?;
        }
        Ok(())
    }

    /// Locks the academic row so default selection runs one writer at a time.
    async fn lock_academic(conn: &mut PgConnection, academic_id: AcademicId) -> Result<(), AppError> {
        sqlx::query("SELECT id FROM academics WHERE id = $1 FOR UPDATE")
            .bind(academic_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Clears the default flag on every location of the academic. Runs before
    /// a new default is written so the one-default index never trips.
    async fn clear_default(conn: &mut PgConnection, academic_id: AcademicId) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE locations SET is_default = FALSE, updated_at = NOW() \
             WHERE academic_id = $1 AND is_default",
        )
        .bind(academic_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Promotes the oldest location when the academic has none marked default.
    async fn ensure_default<'e, E>(executor: E, academic_id: AcademicId) -> Result<(), AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE locations SET is_default = TRUE, updated_at = NOW()
            WHERE id = (
                SELECT id FROM locations WHERE academic_id = $1
                ORDER BY created_at, id LIMIT 1
            )
            AND NOT EXISTS (SELECT 1 FROM locations WHERE academic_id = $1 AND is_default)
            "#,
        )
        .bind(academic_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    async fn write_links(
        conn: &mut PgConnection,
        id: LocationId,
        sport_ids: Option<&[SportId]>,
        amenity_ids: Option<&[AmenityId]>,
    ) -> Result<(), AppError> {
        if let Some(sport_ids) = sport_ids {
            replace_links(
                conn,
                "location_sports",
                "location_id",
                id.into_inner(),
                "sport_id",
                &to_uuids(sport_ids),
            )
            .await?;
        }
        if let Some(amenity_ids) = amenity_ids {
            replace_links(
                conn,
                "location_amenities",
                "location_id",
                id.into_inner(),
                "amenity_id",
                &to_uuids(amenity_ids),
            )
            .await?;
        }
        Ok(())
    }

    async fn invalidate(cache: Option<&RedisCache>, academic_id: AcademicId) {
        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        invalidate::academy_entity(cache, academic_id.into_inner(), "programs").await;
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, location.name = %dto.name, db.operation = "INSERT", db.table = "locations"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: CreateLocationDto,
    ) -> Result<LocationDetail, AppError> {
        Self::check_links(
            db,
            dto.city_id.map(Into::into),
            Some(dto.sport_ids.as_slice()),
            Some(dto.amenity_ids.as_slice()),
        )
        .await?;

        let mut tx = db.begin().await?;
        Self::lock_academic(&mut tx, academic_id).await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE academic_id = $1")
                .bind(academic_id)
                .fetch_one(&mut *tx)
                .await?;
        let is_default = dto.is_default || existing == 0;
        if is_default {
            Self::clear_default(&mut tx, academic_id).await?;
        }

        let id: LocationId = sqlx::query_scalar(
            "INSERT INTO locations (academic_id, name, name_in_google_map, url, city_id, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(academic_id)
        .bind(dto.name.trim())
        .bind(&dto.name_in_google_map)
        .bind(&dto.url)
        .bind(dto.city_id)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?;

        Self::write_links(
            &mut tx,
            id,
            Some(dto.sport_ids.as_slice()),
            Some(dto.amenity_ids.as_slice()),
        )
        .await?;

        tx.commit().await?;

        Self::invalidate(cache, academic_id).await;
        info!(location.id = %id, location.is_default = is_default, "Location created");

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "locations"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: LocationId,
        dto: UpdateLocationDto,
    ) -> Result<LocationDetail, AppError> {
        let existing = Self::get(db, academic_id, id).await?.location;
        Self::check_links(
            db,
            dto.city_id.map(Into::into),
            dto.sport_ids.as_deref(),
            dto.amenity_ids.as_deref(),
        )
        .await?;

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let name_in_google_map = dto.name_in_google_map.or(existing.name_in_google_map);
        let url = dto.url.or(existing.url);
        let city_id = dto.city_id.or(existing.city_id);
        let promote = dto.is_default == Some(true) && !existing.is_default;

        let mut tx = db.begin().await?;
        Self::lock_academic(&mut tx, academic_id).await?;
        if promote {
            Self::clear_default(&mut tx, academic_id).await?;
        }

        sqlx::query(
            "UPDATE locations SET name = $1, name_in_google_map = $2, url = $3, city_id = $4, \
             is_default = is_default OR $5, updated_at = NOW() WHERE id = $6",
        )
        .bind(&name)
        .bind(&name_in_google_map)
        .bind(&url)
        .bind(city_id)
        .bind(promote)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, "name", DUPLICATE))?;

        Self::write_links(
            &mut tx,
            id,
            dto.sport_ids.as_deref(),
            dto.amenity_ids.as_deref(),
        )
        .await?;

        tx.commit().await?;

        Self::invalidate(cache, academic_id).await;
        info!(location.id = %id, "Location updated");

        Self::get(db, academic_id, id).await
    }

    /// Deleting the default location promotes the oldest remaining one.
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "DELETE", db.table = "locations"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: LocationId,
    ) -> Result<(), AppError> {
        let mut tx = db.begin().await?;
        Self::lock_academic(&mut tx, academic_id).await?;

        let result = sqlx::query("DELETE FROM locations WHERE id = $1 AND academic_id = $2")
            .bind(id)
            .bind(academic_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| delete_error(e, "Location"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Location not found")));
        }

        Self::ensure_default(&mut *tx, academic_id).await?;
        tx.commit().await?;

        Self::invalidate(cache, academic_id).await;
        info!(location.id = %id, "Location deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(academic.id = %academic_id, count = ids.len(), db.operation = "DELETE", db.table = "locations"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, "locations", &ids, Some(academic_id)).await?;
        Self::ensure_default(db, academic_id).await?;

        Self::invalidate(cache, academic_id).await;
        info!(deleted, "Locations deleted");

        Ok(deleted)
    }
}
