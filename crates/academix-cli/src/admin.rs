//! System admin accounts. The API never creates these.

use academix_core::hash_password;
use academix_models::{Role, UserId};
use sqlx::PgPool;

use crate::CliResult;

pub async fn create_system_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> CliResult<UserId> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }

    let hashed = hash_password(password).map_err(|e| e.error.to_string())?;

    let id: Option<UserId> = sqlx::query_scalar(
        "INSERT INTO users (name, email, password, role, academic_id) \
         VALUES ($1, $2, $3, $4, NULL) \
         ON CONFLICT (email) DO NOTHING \
         RETURNING id",
    )
    .bind(name.trim())
    .bind(email.trim().to_lowercase())
    .bind(&hashed)
    .bind(Role::SystemAdmin)
    .fetch_optional(db)
    .await?;

    id.ok_or_else(|| "A user with this email already exists".into())
}
