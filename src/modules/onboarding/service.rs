use sqlx::PgPool;
use tracing::{info, instrument};

use academix_cache::{RedisCache, invalidate};
use academix_core::AppError;
use academix_models::AcademicId;

use super::model::{FactsRow, OnboardingStatus, evaluate};
use crate::metrics::track_onboarding_completed;

const FACTS_QUERY: &str = r#"
    SELECT
        (TRIM(a.name) <> '') AS has_name,
        (COALESCE(TRIM(a.description), '') <> '') AS has_description,
        (COALESCE(TRIM(a.logo), '') <> '') AS has_logo,
        (SELECT COUNT(*) FROM academic_sports x WHERE x.academic_id = a.id) AS sports_count,
        (SELECT COUNT(*) FROM locations l WHERE l.academic_id = a.id) AS locations_count,
        (SELECT COUNT(DISTINCT ls.location_id) FROM location_sports ls
            JOIN locations l ON l.id = ls.location_id
            WHERE l.academic_id = a.id) AS locations_with_sports,
        (SELECT COUNT(*) FROM coaches c WHERE c.academic_id = a.id) AS coaches_count,
        (SELECT COUNT(DISTINCT cs.coach_id) FROM coach_sports cs
            JOIN coaches c ON c.id = cs.coach_id
            WHERE c.academic_id = a.id) AS coaches_with_sports,
        (SELECT COUNT(*) FROM programs p WHERE p.academic_id = a.id) AS programs_count,
        (SELECT COUNT(*) FROM packages pk
            JOIN programs p ON p.id = pk.program_id
            WHERE p.academic_id = a.id) AS packages_count,
        (SELECT COUNT(*) FROM schedules sc
            JOIN packages pk ON pk.id = sc.package_id
            JOIN programs p ON p.id = pk.program_id
            WHERE p.academic_id = a.id) AS schedules_count,
        a.entry_fees,
        (COALESCE(TRIM(a.policy), '') <> '') AS has_policy,
        a.onboarded
    FROM academics a
    WHERE a.id = $1
"#;

pub struct OnboardingService;

impl OnboardingService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "academics"))]
    pub async fn status(db: &PgPool, academic_id: AcademicId) -> Result<OnboardingStatus, AppError> {
        let row = sqlx::query_as::<_, FactsRow>(FACTS_QUERY)
            .bind(academic_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Academic not found")))?;

        Ok(evaluate(&row.facts, row.onboarded))
    }

    /// Marks the academy as onboarded once every step is complete. Repeating
    /// the call after that is a no-op.
    #[instrument(skip(db, cache), fields(db.operation = "UPDATE", db.table = "academics"))]
    pub async fn complete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
    ) -> Result<OnboardingStatus, AppError> {
        let mut status = Self::status(db, academic_id).await?;
        if status.onboarded {
            return Ok(status);
        }

        if let Some(step) = status.current_step {
            return Err(AppError::conflict(format!(
                "Onboarding step '{}' is not complete",
                step.as_str()
            ))
            .with_field(step.as_str()));
        }

        sqlx::query("UPDATE academics SET onboarded = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(academic_id)
            .execute(db)
            .await?;

        track_onboarding_completed();
        invalidate::academic(cache, Some(academic_id.into_inner()), false).await;
        info!(academic.id = %academic_id, "Academy onboarding completed");

        status.onboarded = true;
        Ok(status)
    }
}
