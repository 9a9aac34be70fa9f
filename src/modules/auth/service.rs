use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use academix_auth::{create_access_token, create_refresh_token, verify_refresh_token};
use academix_config::JwtConfig;
use academix_core::{AppError, verify_password};
use academix_models::UserId;

use super::model::{LoginRequest, LoginResponse, TokenPair, User};
use crate::metrics;

const USER_COLUMNS: &str = "id, name, email, password, role, academic_id, created_at, updated_at";
const TOKEN_TYPE: &str = "Bearer";

pub struct AuthService;

impl AuthService {
    fn issue_tokens(user: &User, jwt_config: &JwtConfig) -> Result<TokenPair, AppError> {
        let access_token = create_access_token(
            user.id,
            &user.email,
            user.role,
            user.academic_id,
            jwt_config,
        )?;
        let refresh_token = create_refresh_token(user.id, &user.email, jwt_config)?;

        metrics::track_jwt_issued();

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: jwt_config.access_token_expiry,
        })
    }

    #[instrument(skip(db, dto, jwt_config), fields(user.email = %dto.email, db.operation = "SELECT", db.table = "users"))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = $1",
            USER_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some(user) = user else {
            metrics::track_login_failure("unknown_email");
            debug!("Login attempt for unknown email");
            return Err(AppError::unauthorized("Invalid email or password"));
        };

        if !verify_password(&dto.password, &user.password) {
            metrics::track_login_failure("wrong_password");
            warn!(user.id = %user.id, "Login failed: wrong password");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        let tokens = Self::issue_tokens(&user, jwt_config)?;
        metrics::track_login_success(user.role);
        info!(user.id = %user.id, user.role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            user,
        })
    }

    /// Exchanges a refresh token for a new pair. The user is re-read so role
    /// and tenant changes take effect.
    #[instrument(skip_all, fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPair, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid or expired refresh token"))?;

        let user = Self::find_user(db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired refresh token"))?;

        debug!(user.id = %user.id, "Refreshing tokens");
        Self::issue_tokens(&user, jwt_config)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_profile(db: &PgPool, user_id: UserId) -> Result<User, AppError> {
        Self::find_user(db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    async fn find_user(db: &PgPool, user_id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
