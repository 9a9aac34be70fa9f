//! # Academix Cache
//!
//! Optional Redis memoization in front of Postgres plus HTTP-level caching.
//!
//! - [`redis`]: `RedisCache` with `get`, `set`, `get_or_set` and key/pattern deletion
//! - [`ttl`]: lifetime tiers for the different kinds of cached data
//! - [`keys`]: key builders and [`invalidate`] helpers
//! - [`middleware`]: `Cache-Control` and `ETag` layers
//!
//! The cache is always optional. Services receive `Option<&RedisCache>` and
//! go straight to the database when it is `None` or when Redis misbehaves.
//!
//! ```ignore
//! use academix_cache::{cached, keys, ttl};
//!
//! let sports = cached(cache, &keys::reference::list("sports", &hash), ttl::REFERENCE, || {
//!     SportService::fetch_page(db, &filters)
//! })
//! .await?;
//! ```

pub mod config;
pub mod keys;
pub mod middleware;
pub mod redis;
pub mod ttl;

pub use config::CacheConfig;
pub use keys::{hash_filters, invalidate};
pub use middleware::{CacheControlConfig, cache_control, etag_middleware};
pub use redis::{CacheError, RedisCache, cached};
