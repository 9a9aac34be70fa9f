use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use academix_cache::{RedisCache, cached, hash_filters, invalidate, keys, ttl};
use academix_core::{AppError, Paginated};
use academix_models::programs::attach_schedules;
use academix_models::{AcademicId, CoachId, LocationId, PackageId, ProgramId, SportId};

use super::model::{
    CreatePackageDto, CreateProgramDto, Package, PackageWithSchedules, Program, ProgramDetail,
    ProgramFilterParams, ProgramSummary, Schedule, ScheduleInput, UpdatePackageDto,
    UpdateProgramDto,
};
use crate::utils::db::{
    bulk_delete, ensure_rows_exist, push_page, push_search, replace_links, to_uuids,
};

const ENTITY: &str = "programs";
const PROGRAM_COLUMNS: &str = "p.id, p.academic_id, p.location_id, p.sport_id, p.name, \
                               p.description, p.program_type, p.gender, p.start_date_of_birth, \
                               p.end_date_of_birth, p.number_of_seats, p.created_at, p.updated_at";
const PACKAGE_COLUMNS: &str = "pk.id, pk.program_id, pk.name, pk.price, pk.entry_fees, \
                               pk.session_per_week, pk.capacity, pk.start_date, pk.end_date, \
                               pk.created_at, pk.updated_at";

fn date_order_error(field: &str) -> AppError {
    AppError::invalid_field(field, "End date must be on or after the start date")
}

pub struct ProgramService;

impl ProgramService {
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "SELECT", db.table = "programs"))]
    pub async fn list(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        filters: ProgramFilterParams,
    ) -> Result<Paginated<ProgramSummary>, AppError> {
        let key = keys::academy::list(academic_id.into_inner(), ENTITY, &hash_filters(&filters));
        cached(cache, &key, ttl::LIST, || {
            Self::query_list(db, academic_id, &filters)
        })
        .await
    }

    fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &ProgramFilterParams) {
        push_search(query, "p.name", &filters.name);
        if let Some(sport_id) = filters.sport_id {
            query.push(" AND p.sport_id = ").push_bind(sport_id);
        }
        if let Some(location_id) = filters.location_id {
            query.push(" AND p.location_id = ").push_bind(location_id);
        }
        if let Some(program_type) = filters.program_type {
            query.push(" AND p.program_type = ").push_bind(program_type);
        }
    }

    async fn query_list(
        db: &PgPool,
        academic_id: AcademicId,
        filters: &ProgramFilterParams,
    ) -> Result<Paginated<ProgramSummary>, AppError> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM programs p WHERE p.academic_id = ");
        count.push_bind(academic_id);
        Self::push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            r#"
            SELECT {},
                   l.name AS location_name,
                   s.name AS sport_name,
                   ARRAY(SELECT pc.coach_id FROM program_coaches pc
                         WHERE pc.program_id = p.id ORDER BY pc.coach_id) AS coach_ids,
                   (SELECT COUNT(*) FROM packages pk WHERE pk.program_id = p.id) AS packages_count
            FROM programs p
            JOIN locations l ON l.id = p.location_id
            JOIN sports s ON s.id = p.sport_id
            WHERE p.academic_id = "#,
            PROGRAM_COLUMNS
        ));
        query.push_bind(academic_id);
        Self::push_filters(&mut query, filters);
        query.push(" ORDER BY p.name, p.id");
        push_page(&mut query, &filters.pagination);
        let programs = query.build_query_as::<ProgramSummary>().fetch_all(db).await?;

        debug!(total, returned = programs.len(), "Programs fetched");

        Ok(Paginated {
            data: programs,
            meta: filters.pagination.meta(total),
        })
    }

    async fn find(db: &PgPool, academic_id: AcademicId, id: ProgramId) -> Result<Program, AppError> {
        sqlx::query_as::<_, Program>(&format!(
            "SELECT {} FROM programs p WHERE p.id = $1 AND p.academic_id = $2",
            PROGRAM_COLUMNS
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Program not found")))
    }

    async fn schedules_for(db: &PgPool, package_ids: &[PackageId]) -> Result<Vec<Schedule>, AppError> {
        let schedules = sqlx::query_as::<_, Schedule>(
            "SELECT id, package_id, day, start_time, end_time, memo \
             FROM schedules WHERE package_id = ANY($1)",
        )
        .bind(package_ids)
        .fetch_all(db)
        .await?;
        Ok(schedules)
    }

    /// The program with its coaches and every package and schedule.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "programs"))]
    pub async fn get(
        db: &PgPool,
        academic_id: AcademicId,
        id: ProgramId,
    ) -> Result<ProgramDetail, AppError> {
        let program = Self::find(db, academic_id, id).await?;

        let coach_ids = sqlx::query_scalar::<_, CoachId>(
            "SELECT coach_id FROM program_coaches WHERE program_id = $1 ORDER BY coach_id",
        )
        .bind(id)
        .fetch_all(db)
        .await?;

        let packages = sqlx::query_as::<_, Package>(&format!(
            "SELECT {} FROM packages pk WHERE pk.program_id = $1 ORDER BY pk.start_date, pk.name",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_all(db)
        .await?;

        let package_ids: Vec<PackageId> = packages.iter().map(|p| p.id).collect();
        let schedules = Self::schedules_for(db, &package_ids).await?;

        Ok(ProgramDetail {
            program,
            coach_ids,
            packages: attach_schedules(packages, schedules),
        })
    }

    /// Location and coaches must belong to the academic; the sport must be
    /// one of the academic's sports.
    async fn check_links(
        db: &PgPool,
        academic_id: AcademicId,
        location_id: Option<LocationId>,
        sport_id: Option<SportId>,
        coach_ids: Option<&[CoachId]>,
    ) -> Result<(), AppError> {
        if let Some(location_id) = location_id {
            ensure_rows_exist(
                db,
                "locations",
                &[location_id.into_inner()],
                Some(academic_id),
                "location_id",
            )
            .await?;
        }

        if let Some(sport_id) = sport_id {
            let offered: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM academic_sports WHERE academic_id = $1 AND sport_id = $2)",
            )
            .bind(academic_id)
            .bind(sport_id)
            .fetch_one(db)
            .await?;
            if !offered {
                return Err(AppError::invalid_field(
                    "sport_id",
                    "The academy does not offer this sport",
                ));
            }
        }

        if let Some(coach_ids) = coach_ids {
            ensure_rows_exist(db, "coaches", &to_uuids(coach_ids), Some(academic_id), "coach_ids")
                .await?;
        }

        Ok(())
    }

    async fn write_coaches(
        conn: &mut PgConnection,
        id: ProgramId,
        coach_ids: &[CoachId],
    ) -> Result<(), AppError> {
        replace_links(
            conn,
            "program_coaches",
            "program_id",
            id.into_inner(),
            "coach_id",
            &to_uuids(coach_ids),
        )
        .await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, program.name = %dto.name, db.operation = "INSERT", db.table = "programs"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        dto: CreateProgramDto,
    ) -> Result<ProgramDetail, AppError> {
        Self::check_links(
            db,
            academic_id,
            Some(dto.location_id),
            Some(dto.sport_id),
            Some(dto.coach_ids.as_slice()),
        )
        .await?;

        let mut tx = db.begin().await?;

        let id: ProgramId = sqlx::query_scalar(
            r#"
            INSERT INTO programs (academic_id, location_id, sport_id, name, description,
                program_type, gender, start_date_of_birth, end_date_of_birth, number_of_seats)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(academic_id)
        .bind(dto.location_id)
        .bind(dto.sport_id)
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.program_type)
        .bind(dto.gender)
        .bind(dto.start_date_of_birth)
        .bind(dto.end_date_of_birth)
        .bind(dto.number_of_seats.unwrap_or(0))
        .fetch_one(&mut *tx)
        .await?;

        Self::write_coaches(&mut tx, id, &dto.coach_ids).await?;

        tx.commit().await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(program.id = %id, "Program created");

        Self::get(db, academic_id, id).await
    }

    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "programs"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: ProgramId,
        dto: UpdateProgramDto,
    ) -> Result<ProgramDetail, AppError> {
        let existing = Self::find(db, academic_id, id).await?;
        Self::check_links(
            db,
            academic_id,
            dto.location_id,
            dto.sport_id,
            dto.coach_ids.as_deref(),
        )
        .await?;

        let location_id = dto.location_id.unwrap_or(existing.location_id);
        let sport_id = dto.sport_id.unwrap_or(existing.sport_id);
        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let description = dto.description.or(existing.description);
        let program_type = dto.program_type.unwrap_or(existing.program_type);
        let gender = dto.gender.or(existing.gender);
        let start_date_of_birth = dto.start_date_of_birth.or(existing.start_date_of_birth);
        let end_date_of_birth = dto.end_date_of_birth.or(existing.end_date_of_birth);
        let number_of_seats = dto.number_of_seats.unwrap_or(existing.number_of_seats);

        if let (Some(start), Some(end)) = (start_date_of_birth, end_date_of_birth) {
            if end < start {
                return Err(date_order_error("end_date_of_birth"));
            }
        }

        let mut tx = db.begin().await?;

        sqlx::query(
            r#"
            UPDATE programs SET location_id = $1, sport_id = $2, name = $3, description = $4,
                program_type = $5, gender = $6, start_date_of_birth = $7, end_date_of_birth = $8,
                number_of_seats = $9, updated_at = NOW()
            WHERE id = $10
            "#,
        )
        .bind(location_id)
        .bind(sport_id)
        .bind(&name)
        .bind(&description)
        .bind(program_type)
        .bind(gender)
        .bind(start_date_of_birth)
        .bind(end_date_of_birth)
        .bind(number_of_seats)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(coach_ids) = &dto.coach_ids {
            Self::write_coaches(&mut tx, id, coach_ids).await?;
        }

        tx.commit().await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(program.id = %id, "Program updated");

        Self::get(db, academic_id, id).await
    }

    /// Removes the program with its packages, schedules and bookings.
    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "DELETE", db.table = "programs"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: ProgramId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1 AND academic_id = $2")
            .bind(id)
            .bind(academic_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Program not found")));
        }

        invalidate_with_bookings(cache, academic_id).await;
        info!(program.id = %id, "Program deleted");

        Ok(())
    }

    #[instrument(skip(db, cache, ids), fields(academic.id = %academic_id, count = ids.len(), db.operation = "DELETE", db.table = "programs"))]
    pub async fn bulk_delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        ids: Vec<Uuid>,
    ) -> Result<u64, AppError> {
        let deleted = bulk_delete(db, "programs", &ids, Some(academic_id)).await?;

        invalidate_with_bookings(cache, academic_id).await;
        info!(deleted, "Programs deleted");

        Ok(deleted)
    }
}

async fn invalidate_with_bookings(cache: Option<&RedisCache>, academic_id: AcademicId) {
    let academic_id = academic_id.into_inner();
    invalidate::academy_entity(cache, academic_id, ENTITY).await;
    invalidate::academy_entity(cache, academic_id, "bookings").await;
    invalidate::dashboard(cache, academic_id).await;
}

pub struct PackageService;

impl PackageService {
    /// A package of one of the academic's programs.
    pub(crate) async fn find<'e, E>(
        executor: E,
        academic_id: AcademicId,
        id: PackageId,
    ) -> Result<Package, AppError>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Package>(&format!(
            "SELECT {} FROM packages pk JOIN programs p ON p.id = pk.program_id \
             WHERE pk.id = $1 AND p.academic_id = $2",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .bind(academic_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Package not found")))
    }

    async fn with_schedules(db: &PgPool, package: Package) -> Result<PackageWithSchedules, AppError> {
        let schedules = ProgramService::schedules_for(db, &[package.id]).await?;
        let mut grouped = attach_schedules(vec![package], schedules);
        grouped
            .pop()
            .ok_or_else(|| AppError::internal_error("Package disappeared while loading schedules"))
    }

    async fn insert_schedules(
        conn: &mut PgConnection,
        package_id: PackageId,
        schedules: &[ScheduleInput],
    ) -> Result<(), AppError> {
        if schedules.is_empty() {
            return Ok(());
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO schedules (package_id, day, start_time, end_time, memo) ",
        );
        query.push_values(schedules, |mut row, schedule| {
            row.push_bind(package_id)
                .push_bind(schedule.day)
                .push_bind(schedule.start_time)
                .push_bind(schedule.end_time)
                .push_bind(schedule.memo.clone());
        });
        query.build().execute(&mut *conn).await?;

        Ok(())
    }

    /// Creates the package and its schedules in one transaction.
    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, program.id = %program_id, db.operation = "INSERT", db.table = "packages"))]
    pub async fn create(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        program_id: ProgramId,
        dto: CreatePackageDto,
    ) -> Result<PackageWithSchedules, AppError> {
        ProgramService::find(db, academic_id, program_id).await?;

        let mut tx = db.begin().await?;

        let package = sqlx::query_as::<_, Package>(
            r#"
            INSERT INTO packages (program_id, name, price, entry_fees, session_per_week, capacity,
                start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, program_id, name, price, entry_fees, session_per_week, capacity,
                start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(program_id)
        .bind(dto.name.trim())
        .bind(dto.price)
        .bind(dto.entry_fees.unwrap_or(0.0))
        .bind(dto.session_per_week)
        .bind(dto.capacity)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_schedules(&mut tx, package.id, &dto.schedules).await?;

        tx.commit().await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        info!(package.id = %package.id, schedules = dto.schedules.len(), "Package created");

        Self::with_schedules(db, package).await
    }

    /// Updates the package; `schedules`, when sent, replace the existing ones.
    #[instrument(skip(db, cache, dto), fields(academic.id = %academic_id, db.operation = "UPDATE", db.table = "packages"))]
    pub async fn update(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: PackageId,
        dto: UpdatePackageDto,
    ) -> Result<PackageWithSchedules, AppError> {
        let existing = Self::find(db, academic_id, id).await?;

        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        if end_date < start_date {
            return Err(date_order_error("end_date"));
        }

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let price = dto.price.unwrap_or(existing.price);
        let entry_fees = dto.entry_fees.unwrap_or(existing.entry_fees);
        let session_per_week = dto.session_per_week.unwrap_or(existing.session_per_week);
        let capacity = dto.capacity.or(existing.capacity);

        let mut tx = db.begin().await?;

        let package = sqlx::query_as::<_, Package>(
            r#"
            UPDATE packages SET name = $1, price = $2, entry_fees = $3, session_per_week = $4,
                capacity = $5, start_date = $6, end_date = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING id, program_id, name, price, entry_fees, session_per_week, capacity,
                start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(price)
        .bind(entry_fees)
        .bind(session_per_week)
        .bind(capacity)
        .bind(start_date)
        .bind(end_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(schedules) = &dto.schedules {
            sqlx::query("DELETE FROM schedules WHERE package_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::insert_schedules(&mut tx, id, schedules).await?;
        }

        tx.commit().await?;

        invalidate::academy_entity(cache, academic_id.into_inner(), ENTITY).await;
        invalidate::dashboard(cache, academic_id.into_inner()).await;
        info!(package.id = %id, "Package updated");

        Self::with_schedules(db, package).await
    }

    #[instrument(skip(db, cache), fields(academic.id = %academic_id, db.operation = "DELETE", db.table = "packages"))]
    pub async fn delete(
        db: &PgPool,
        cache: Option<&RedisCache>,
        academic_id: AcademicId,
        id: PackageId,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM packages pk USING programs p \
             WHERE pk.id = $1 AND p.id = pk.program_id AND p.academic_id = $2",
        )
        .bind(id)
        .bind(academic_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Package not found")));
        }

        invalidate_with_bookings(cache, academic_id).await;
        info!(package.id = %id, "Package deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_order_error_names_field() {
        let err = date_order_error("end_date");
        assert_eq!(err.status.as_u16(), 422);
        assert_eq!(err.field.as_deref(), Some("end_date"));
    }
}
