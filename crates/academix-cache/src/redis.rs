//! Redis client with JSON values and get-or-set memoization.
//!
//! Reads never fail: a Redis error or an undecodable value is logged and
//! reported as a miss, so callers fall through to the database.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::CacheConfig;

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
    prefix: String,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("default_ttl", &self.default_ttl)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RedisCache {
    /// Connects to Redis. Every key passed to this client is stored under `prefix:`.
    pub async fn new(
        redis_url: &str,
        default_ttl: Duration,
        prefix: impl Into<String>,
    ) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            default_ttl,
            prefix: prefix.into(),
        })
    }

    pub async fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(
            &config.redis_url,
            Duration::from_secs(config.default_ttl_seconds),
            config.key_prefix.clone(),
        )
        .await
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.conn.clone();
        let key = self.namespaced(key);

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => match serde_json::from_str(&value) {
                Ok(parsed) => {
                    debug!(cache.key = %key, "Cache hit");
                    Some(parsed)
                }
                Err(e) => {
                    warn!(cache.key = %key, error = %e, "Discarding undecodable cached value");
                    None
                }
            },
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)?;

        conn.set_ex::<_, _, ()>(self.namespaced(key), json, ttl.as_secs())
            .await?;

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    /// Returns the cached value for `key`, or runs `fetch` and stores its
    /// successful result for `ttl`. Errors from `fetch` are returned untouched
    /// and never cached.
    #[instrument(skip(self, fetch), fields(cache.operation = "GET_OR_SET"))]
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            metrics::counter!("cache_lookups_total", "result" => "hit").increment(1);
            return Ok(hit);
        }
        metrics::counter!("cache_lookups_total", "result" => "miss").increment(1);

        let value = fetch().await?;

        if let Err(e) = self.set_with_ttl(key, &value, ttl).await {
            warn!(cache.key = %key, error = %e, "Failed to store value in cache");
        }

        Ok(value)
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(self.namespaced(key)).await?;

        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }

    /// Deletes every key matching a glob `pattern` (relative to the prefix)
    /// using `SCAN`, returning how many keys were removed.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = self.namespaced(pattern);
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }
}

/// Memoizes `fetch` through `cache` when one is configured, otherwise just runs it.
pub async fn cached<T, E, F, Fut>(
    cache: Option<&RedisCache>,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache {
        Some(cache) => cache.get_or_set(key, ttl, fetch).await,
        None => fetch().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sport {
        name: String,
    }

    #[tokio::test]
    async fn test_cached_without_redis_runs_fetch() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let result: Result<Sport, String> =
            cached(None, "sports:1", Duration::from_secs(5), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Sport {
                    name: "Padel".to_string(),
                })
            })
            .await;

        assert_eq!(result.unwrap().name, "Padel");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_without_redis_passes_errors_through() {
        let result: Result<Sport, String> =
            cached(None, "sports:1", Duration::from_secs(5), || async {
                Err("database unavailable".to_string())
            })
            .await;

        assert_eq!(result.unwrap_err(), "database unavailable");
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_get_or_set_memoizes() {
        let cache = RedisCache::new("redis://localhost:6379", Duration::from_secs(60), "academix-test")
            .await
            .unwrap();
        cache.invalidate("sports:memo").await.unwrap();

        let counter = AtomicUsize::new(0);
        let calls = &counter;
        for _ in 0..2 {
            let sport: Result<Sport, String> = cache
                .get_or_set("sports:memo", Duration::from_secs(60), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Sport {
                        name: "Football".to_string(),
                    })
                })
                .await;
            assert_eq!(sport.unwrap().name, "Football");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cache.invalidate("sports:memo").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_invalidate_pattern() {
        let cache = RedisCache::new("redis://localhost:6379", Duration::from_secs(60), "academix-test")
            .await
            .unwrap();

        for page in 1..=3 {
            let key = format!("sports:list:{page}");
            cache.set(&key, &page).await.unwrap();
        }

        let deleted = cache.invalidate_pattern("sports:list:*").await.unwrap();
        assert_eq!(deleted, 3);
        assert!(cache.get::<i32>("sports:list:1").await.is_none());
    }
}
