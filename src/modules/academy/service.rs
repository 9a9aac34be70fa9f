use sqlx::PgPool;
use tracing::instrument;

use academix_cache::{RedisCache, cached, keys, ttl};
use academix_core::AppError;
use academix_models::AcademicId;
use academix_models::academics::{AcademicDetail, UpdateAcademicDto};

use crate::modules::academics::service::AcademicService;

pub struct AcademyService;

impl AcademyService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "academics"))]
    pub async fn get_profile(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
    ) -> Result<AcademicDetail, AppError> {
        let key = keys::academy::profile(academic_id.into_inner());
        cached(cache, &key, ttl::DETAIL, || AcademicService::detail(db, academic_id)).await
    }

    /// Sport ids, when sent, replace the academy's sports.
    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "academics"))]
    pub async fn update_profile(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: UpdateAcademicDto,
    ) -> Result<AcademicDetail, AppError> {
        AcademicService::apply_update(db, cache, academic_id, dto).await
    }
}
