use academix_cache::RedisCache;
use academix_config::{CorsConfig, JwtConfig};
use sqlx::PgPool;

/// Shared by every handler. `cache` is `None` when Redis is disabled or
/// unreachable at startup; every cached read then goes straight to Postgres.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: Option<RedisCache>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: PgPool, cache: Option<RedisCache>) -> Self {
        Self {
            db,
            cache,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
        }
    }

    pub fn cache(&self) -> Option<&RedisCache> {
        self.cache.as_ref()
    }
}
