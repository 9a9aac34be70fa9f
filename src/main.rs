use academix::logging::init_tracing;
use academix::metrics::{init_metrics, metrics_app};
use academix::router::init_router;
use academix::state::AppState;
use academix_cache::{CacheConfig, RedisCache};
use academix_config::ServerConfig;
use academix_db::{init_db_pool, run_migrations};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = ServerConfig::from_env();
    init_tracing(&config.log_dir)?;

    let db = init_db_pool(config.database_max_connections).await;
    run_migrations(&db).await?;

    let state = AppState::new(db, connect_cache().await);
    let mut app = init_router(state);

    if let Some(handle) = init_metrics(config.metrics_enabled)? {
        app = app.merge(metrics_app(handle));
        info!("Prometheus metrics exposed on /metrics");
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!(%address, "Server listening");
    info!("Swagger UI on /swagger-ui, Scalar on /scalar");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Redis is optional. Without it every read goes to Postgres.
async fn connect_cache() -> Option<RedisCache> {
    let config = CacheConfig::from_env();
    if !config.enabled {
        info!("Cache disabled");
        return None;
    }

    match RedisCache::from_config(&config).await {
        Ok(cache) => {
            info!(url = %config.redis_url, "Connected to Redis");
            Some(cache)
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable, continuing without cache");
            None
        }
    }
}
