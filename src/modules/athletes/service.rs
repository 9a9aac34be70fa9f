use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::common::search_term;
use academix_models::{AcademicId, AthleteId, AthleteType};

use super::model::{AthleteFilterParams, AthleteWithBookings, CreateAthleteDto, UpdateAthleteDto};
use crate::utils::db::{bulk_delete, push_page};

const ENTITY: &str = "athletes";
const SELECT: &str = r#"
    SELECT a.id, a.academic_id, a.first_name, a.last_name, a.email, a.phone, a.gender,
           a.date_of_birth, a.athlete_type, a.created_at, a.updated_at,
           (SELECT COUNT(*) FROM bookings b WHERE b.athlete_id = a.id) AS bookings_count
    FROM athletes a
"#;

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

pub struct AthleteService;

impl AthleteService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "athletes"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        filters: AthleteFilterParams,
    ) -> Result<Paginated<AthleteWithBookings>, AppError> {
        let key = keys::academy::list(academic_id.into_inner(), ENTITY, &hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || {
            Self::query_list(db, academic_id, &filters)
        })
        .await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &AthleteFilterParams) {
        if let Some(pattern) = search_term(&filters.search) {
            query
                .push(" AND (a.first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR (a.first_name || ' ' || a.last_name) ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(athlete_type) = filters.athlete_type {
            query.push(" AND a.athlete_type = ").push_bind(athlete_type);
        }
    }

    async fn query_list(
        db: &PgPool,
        academic_id: AcademicId,
        filters: &AthleteFilterParams,
    ) -> Result<Paginated<AthleteWithBookings>, AppError> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM athletes a WHERE a.academic_id = ");
        count.push_bind(academic_id);
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("{} WHERE a.academic_id = ", SELECT));
        query.push_bind(academic_id);
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY a.created_at DESC, a.id");
        push_page(&mut query, &filters.pagination);
        let athletes = query
            .build_query_as::<AthleteWithBookings>()
            .fetch_all(db)
            .await?;

        debug!(total, returned = athletes.len(), "Athletes fetched");

        Ok(Paginated {
            data: athletes,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "athletes"))]
    pub async fn get(
        db: &PgPool,
        academic_id: AcademicId,
        id: AthleteId,
    ) -> Result<AthleteWithBookings, AppError> {
        sqlx::query_as::<_, AthleteWithBookings>(&format!(
            "{} WHERE a.id = $1 AND a.academic_id = $2",
            SELECT
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Athlete not found")))
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "INSERT", db.table = "athletes"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: CreateAthleteDto,
    ) -> Result<AthleteWithBookings, AppError> {
        let id: AthleteId = sqlx::query_scalar(
            "INSERT INTO athletes \
             (academic_id, first_name, last_name, email, phone, gender, date_of_birth, athlete_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(academic_id)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(normalize_email(dto.email))
        .bind(&dto.phone)
        .bind(dto.gender)
        .bind(dto.date_of_birth)
        .bind(dto.athlete_type.unwrap_or(AthleteType::Primary))
        .fetch_one(db)
        .await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        invalidate::dashboard(cache, academic_id.into_inner()).await;
        info!(athlete.id = %id, "Athlete created");

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "athletes"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: AthleteId,
        dto: UpdateAthleteDto,
    ) -> Result<AthleteWithBookings, AppError> {
        let existing = Self::get(db, academic_id, id).await?.athlete;

        let first_name = dto
            .first_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.first_name);
        let last_name = dto
            .last_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.last_name);
        let email = normalize_email(dto.email).or(existing.email);
        let phone = dto.phone.or(existing.phone);
        let gender = dto.gender.or(existing.gender);
        let date_of_birth = dto.date_of_birth.or(existing.date_of_birth);
        let athlete_type = dto.athlete_type.unwrap_or(existing.athlete_type);

        sqlx::query(
            "UPDATE athletes SET first_name = $1, last_name = $2, email = $3, phone = $4, \
             gender = $5, date_of_birth = $6, athlete_type = $7, updated_at = NOW() \
             WHERE id = $8",
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&phone)
        .bind(gender)
        .bind(date_of_birth)
        .bind(athlete_type)
        .bind(id)
        .execute(db)
        .await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(athlete.id = %id, "Athlete updated");

        Self::get(db, academic_id, id).await
    }

    /// Removes the athlete together with their bookings.
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "DELETE", db.table = "athletes"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: AthleteId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM athletes WHERE id = $1 AND academic_id = $2")
            .bind(id)
            .bind(academic_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Athlete not found")));
        }

        Self::invalidate_all(cache, academic_id).await;
        info!(athlete.id = %id, "Athlete deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(academic.id = %academic_id, count = ids.len(), db.operation = "DELETE", db.table = "athletes"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, "athletes", &ids, Some(academic_id)).await?;

        Self::invalidate_all(cache, academic_id).await;
        info!(deleted, "Athletes deleted");

        Ok(deleted)
    }

    async fn invalidate_all(cache: Option<&RedisCache>, academic_id: AcademicId) {
        let academic_id = academic_id.into_inner();
        invalidate::academy_entity(cache, academic_id, ENTITY).await;
        invalidate::academy_entity(cache, academic_id, "bookings").await;
        invalidate::dashboard(cache, academic_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email(Some("  Omar@Club.COM ".to_string())),
            Some("omar@club.com".to_string())
        );
        assert_eq!(normalize_email(Some("   ".to_string())), None);
        assert_eq!(normalize_email(None), None);
    }

    #[test]
    fn test_search_matches_names_and_email() {
        let filters = AthleteFilterParams {
            search: Some("omar".to_string()),
            athlete_type: Some(AthleteType::Fellow),
            ..Default::default()
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM athletes a WHERE 1=1");
        AthleteService::push_filters(&mut query, &filters);
        let sql = query.sql();
        assert!(sql.contains("a.first_name ILIKE $1"));
        assert!(sql.contains("a.email ILIKE $4"));
        assert!(sql.ends_with("AND a.athlete_type = $5"));
    }
}
