use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::{AcademicId, CoachId, SportId};

use super::model::{CoachDetail, CoachFilterParams, CreateCoachDto, UpdateCoachDto};
use crate::utils::db::{
    bulk_delete, ensure_rows_exist, push_page, push_search, replace_links, to_uuids,
};

const ENTITY: &str = "coaches";
const SELECT: &str = r#"
    SELECT c.id, c.academic_id, c.name, c.title, c.bio, c.gender, c.date_of_birth, c.image,
           c.created_at, c.updated_at,
           ARRAY(SELECT cs.sport_id FROM coach_sports cs
                 WHERE cs.coach_id = c.id ORDER BY cs.sport_id) AS sport_ids
    FROM coaches c
"#;

pub struct CoachService;

impl CoachService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "coaches"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        filters: CoachFilterParams,
    ) -> Result<Paginated<CoachDetail>, AppError> {
        let key = keys::academy::list(academic_id.into_inner(), ENTITY, &hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || {
            Self::query_list(db, academic_id, &filters)
        })
        .await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &CoachFilterParams) {
        push_search(query, "c.name", &filters.name);
        if let Some(sport_id) = filters.sport_id {
            query
                .push(" AND EXISTS (SELECT 1 FROM coach_sports cs WHERE cs.coach_id = c.id AND cs.sport_id = ")
                .push_bind(sport_id)
                .push(")");
        }
    }

    async fn query_list(
        db: &PgPool,
        academic_id: AcademicId,
        filters: &CoachFilterParams,
    ) -> Result<Paginated<CoachDetail>, AppError> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM coaches c WHERE c.academic_id = ");
        count.push_bind(academic_id);
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("{} WHERE c.academic_id = ", SELECT));
        query.push_bind(academic_id);
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY c.name");
        push_page(&mut query, &filters.pagination);
        let coaches = query.build_query_as::<CoachDetail>().fetch_all(db).await?;

        debug!(total, returned = coaches.len(), "Coaches fetched");

        Ok(Paginated {
            data: coaches,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "coaches"))]
    pub async fn get(
        db: &PgPool,
        academic_id: AcademicId,
        id: CoachId,
    ) -> Result<CoachDetail, AppError> {
        sqlx::query_as::<_, CoachDetail>(&format!(
            "{} WHERE c.id = $1 AND c.academic_id = $2",
            SELECT
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Coach not found")))
    }

    async fn check_sports(db: &PgPool, sport_ids: &[SportId]) -> Result<(), AppError> {
        ensure_rows_exist(db, "sports", &to_uuids(sport_ids), None, "sport_ids").await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "INSERT", db.table = "coaches"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: CreateCoachDto,
    ) -> Result<CoachDetail, AppError> {
        Self::check_sports(db, &dto.sport_ids).await?;

        let mut tx = db.begin().await?;

        let id: CoachId = sqlx::query_scalar(
            "INSERT INTO coaches (academic_id, name, title, bio, gender, date_of_birth, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(academic_id)
        .bind(dto.name.trim())
        .bind(&dto.title)
        .bind(&dto.bio)
        .bind(dto.gender)
        .bind(dto.date_of_birth)
        .bind(&dto.image)
        .fetch_one(&mut *tx)
        .await?;

        replace_links(
            &mut tx,
            "coach_sports",
            "coach_id",
            id.into_inner(),
            "sport_id",
            &to_uuids(&dto.sport_ids),
        )
        .await?;

        tx.commit().await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(coach.id = %id, "Coach created");

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "coaches"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: CoachId,
        dto: UpdateCoachDto,
    ) -> Result<CoachDetail, AppError> {
        let existing = Self::get(db, academic_id, id).await?.coach;
        if let Some(sport_ids) = &dto.sport_ids {
            Self::check_sports(db, sport_ids).await?;
        }

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let title = dto.title.or(existing.title);
        let bio = dto.bio.or(existing.bio);
        let gender = dto.gender.or(existing.gender);
        let date_of_birth = dto.date_of_birth.or(existing.date_of_birth);
        let image = dto.image.or(existing.image);

        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE coaches SET name = $1, title = $2, bio = $3, gender = $4, date_of_birth = $5, \
             image = $6, updated_at = NOW() WHERE id = $7",
        )
        .bind(&name)
        .bind(&title)
        .bind(&bio)
        .bind(gender)
        .bind(date_of_birth)
        .bind(&image)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(sport_ids) = &dto.sport_ids {
            replace_links(
                &mut tx,
                "coach_sports",
                "coach_id",
                id.into_inner(),
                "sport_id",
                &to_uuids(sport_ids),
            )
            .await?;
        }

        tx.commit().await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(coach.id = %id, "Coach updated");

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "DELETE", db.table = "coaches"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: CoachId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM coaches WHERE id = $1 AND academic_id = $2")
            .bind(id)
            .bind(academic_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Coach not found")));
        }

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(coach.id = %id, "Coach deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(academic.id = %academic_id, count = ids.len(), db.operation = "DELETE", db.table = "coaches"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, "coaches", &ids, Some(academic_id)).await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(deleted, "Coaches deleted");

        Ok(deleted)
    }
}
