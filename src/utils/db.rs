//! Query helpers shared by the services: error mapping, bulk deletes,
//! ownership checks and paging.

use academix_core::{AppError, PaginationParams};
use academix_models::AcademicId;
use academix_models::common::search_term;
use sqlx::{Executor, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Maps a failed insert or update. Duplicates become a 409 on `field`.
pub fn write_error(e: sqlx::Error, field: &str, duplicate_message: &str) -> AppError {
    if is_unique_violation(&e) {
        return AppError::conflict(duplicate_message.to_string()).with_field(field);
    }
    error!(error = %e, "Database write failed");
    AppError::database(e)
}

/// Maps a failed delete. Rows still referenced elsewhere become a 409.
pub fn delete_error(e: sqlx::Error, entity: &str) -> AppError {
    if is_foreign_key_violation(&e) {
        return AppError::conflict(format!("{} is still in use", entity));
    }
    error!(error = %e, "Database delete failed");
    AppError::database(e)
}

pub fn to_uuids<T: Copy + Into<Uuid>>(ids: &[T]) -> Vec<Uuid> {
    ids.iter().map(|&id| id.into()).collect()
}

/// Deletes `ids` from `table`, limited to one academic when given. Ids that
/// do not exist (or belong to someone else) are skipped.
pub async fn bulk_delete(
    db: &PgPool,
    table: &'static str,
    ids: &[Uuid],
    academic_id: Option<AcademicId>,
) -> Result<u64, AppError> {
    let mut query = QueryBuilder::<Postgres>::new(format!("DELETE FROM {} WHERE id = ANY(", table));
    query.push_bind(ids.to_vec()).push(")");
    if let Some(academic_id) = academic_id {
        query.push(" AND academic_id = ").push_bind(academic_id);
    }

    let result = query
        .build()
        .execute(db)
        .await
        .map_err(|e| delete_error(e, "One of the selected records"))?;

    Ok(result.rows_affected())
}

/// Checks every id exists in `table` (and belongs to `academic_id` when
/// given), failing with a 422 on `field` otherwise.
pub async fn ensure_rows_exist<'e, E>(
    executor: E,
    table: &'static str,
    ids: &[Uuid],
    academic_id: Option<AcademicId>,
    field: &str,
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut unique = ids.to_vec();
    unique.sort();
    unique.dedup();
    if unique.is_empty() {
        return Ok(());
    }
    let expected = unique.len() as i64;

    let mut query =
        QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {} WHERE id = ANY(", table));
    query.push_bind(unique).push(")");
    if let Some(academic_id) = academic_id {
        query.push(" AND academic_id = ").push_bind(academic_id);
    }

    let found: i64 = query.build_query_scalar().fetch_one(executor).await?;
    if found != expected {
        return Err(AppError::invalid_field(
            field,
            format!("{} references a record that does not exist", field),
        ));
    }

    Ok(())
}

/// Rewrites the rows of a join table for one owner, e.g. the sports of a
/// coach: `replace_links(conn, "coach_sports", "coach_id", id, "sport_id", &ids)`.
pub async fn replace_links(
    conn: &mut PgConnection,
    table: &'static str,
    owner_column: &'static str,
    owner_id: Uuid,
    item_column: &'static str,
    items: &[Uuid],
) -> Result<(), AppError> {
    sqlx::query(&format!("DELETE FROM {} WHERE {} = $1", table, owner_column))
        .bind(owner_id)
        .execute(&mut *conn)
        .await?;

    if !items.is_empty() {
        sqlx::query(&format!(
            "INSERT INTO {} ({}, {}) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
            table, owner_column, item_column
        ))
        .bind(owner_id)
        .bind(items)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Adds `AND column ILIKE '%term%'` unless the term is blank.
pub fn push_search(query: &mut QueryBuilder<'_, Postgres>, column: &str, term: &Option<String>) {
    if let Some(pattern) = search_term(term) {
        query
            .push(format!(" AND {} ILIKE ", column))
            .push_bind(pattern);
    }
}

pub fn push_page(query: &mut QueryBuilder<'_, Postgres>, params: &PaginationParams) {
    query
        .push(" LIMIT ")
        .push_bind(params.limit())
        .push(" OFFSET ")
        .push_bind(params.offset());
}
