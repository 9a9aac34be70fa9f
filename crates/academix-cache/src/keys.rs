//! Cache key builders and invalidation helpers.
//!
//! Keys are relative; [`RedisCache`] adds the configured prefix. Tenant data
//! lives under `academic:{id}:...` so a single pattern clears one academy.

use crate::RedisCache;
use tracing::warn;
use uuid::Uuid;

fn build_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Countries, cities, sports and amenities, addressed by table name.
pub mod reference {
    use super::*;

    pub fn by_id(table: &str, id: Uuid) -> String {
        build_key(&[table, &id.to_string()])
    }

    pub fn list(table: &str, filters_hash: &str) -> String {
        build_key(&[table, "list", filters_hash])
    }

    pub fn list_pattern(table: &str) -> String {
        format!("{}:list:*", table)
    }
}

pub mod academics {
    use super::*;

    pub fn by_id(academic_id: Uuid) -> String {
        build_key(&["academic", &academic_id.to_string(), "detail"])
    }

    pub fn list(filters_hash: &str) -> String {
        build_key(&["academics", "list", filters_hash])
    }

    pub fn list_pattern() -> String {
        "academics:list:*".to_string()
    }

    /// Every key stored for one academy, including its dashboard and lists.
    pub fn tenant_pattern(academic_id: Uuid) -> String {
        format!("academic:{}:*", academic_id)
    }
}

/// Per-academy keys.
pub mod academy {
    use super::*;

    pub fn profile(academic_id: Uuid) -> String {
        build_key(&["academic", &academic_id.to_string(), "profile"])
    }

    pub fn list(academic_id: Uuid, entity: &str, filters_hash: &str) -> String {
        build_key(&["academic", &academic_id.to_string(), entity, "list", filters_hash])
    }

    pub fn list_pattern(academic_id: Uuid, entity: &str) -> String {
        format!("academic:{}:{}:list:*", academic_id, entity)
    }
}

pub mod dashboard {
    use super::*;

    pub fn summary(academic_id: Uuid, range_hash: &str) -> String {
        build_key(&["academic", &academic_id.to_string(), "dashboard", range_hash])
    }

    pub fn pattern(academic_id: Uuid) -> String {
        format!("academic:{}:dashboard:*", academic_id)
    }
}

/// Short, stable key component derived from filter parameters.
pub fn hash_filters<T: std::hash::Hash>(filters: &T) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    let mut hasher = DefaultHasher::new();
    filters.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

/// Deletes the keys affected by a write. Failures are logged and swallowed.
pub mod invalidate {
    use super::*;

    async fn key(cache: &RedisCache, key: &str) {
        if let Err(e) = cache.invalidate(key).await {
            warn!(error = %e, cache.key = %key, "Failed to invalidate cache key");
        }
    }

    async fn pattern(cache: &RedisCache, pattern: &str) {
        if let Err(e) = cache.invalidate_pattern(pattern).await {
            warn!(error = %e, cache.pattern = %pattern, "Failed to invalidate cache pattern");
        }
    }

    /// After any write to a reference table; `ids` are the rows touched.
    pub async fn reference(cache: Option<&RedisCache>, table: &str, ids: &[Uuid]) {
        let Some(cache) = cache else { return };

        for id in ids {
            key(cache, &reference::by_id(table, *id)).await;
        }
        pattern(cache, &reference::list_pattern(table)).await;
    }

    /// After creating, updating or deleting an academic. Deleting also drops
    /// everything cached for that tenant.
    pub async fn academic(cache: Option<&RedisCache>, academic_id: Option<Uuid>, deleted: bool) {
        let Some(cache) = cache else { return };

        if let Some(id) = academic_id {
            key(cache, &academics::by_id(id)).await;
            key(cache, &academy::profile(id)).await;
            if deleted {
                pattern(cache, &academics::tenant_pattern(id)).await;
            }
        }
        pattern(cache, &academics::list_pattern()).await;
    }

    /// After a write to one of an academy's entity tables.
    pub async fn academy_entity(cache: Option<&RedisCache>, academic_id: Uuid, entity: &str) {
        let Some(cache) = cache else { return };

        pattern(cache, &academy::list_pattern(academic_id, entity)).await;
    }

    /// After any booking write, or anything else that moves dashboard numbers.
    pub async fn dashboard(cache: Option<&RedisCache>, academic_id: Uuid) {
        let Some(cache) = cache else { return };

        pattern(cache, &dashboard::pattern(academic_id)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_keys() {
        let id = Uuid::nil();
        assert_eq!(
            reference::by_id("sports", id),
            format!("sports:{}", id)
        );
        assert_eq!(reference::list("cities", "abc"), "cities:list:abc");
        assert_eq!(reference::list_pattern("cities"), "cities:list:*");
    }

    #[test]
    fn test_tenant_keys_share_academic_namespace() {
        let id = Uuid::new_v4();
        let tenant = academics::tenant_pattern(id);
        let prefix = tenant.trim_end_matches('*');

        assert!(academy::profile(id).starts_with(prefix));
        assert!(academy::list(id, "coaches", "f00").starts_with(prefix));
        assert!(dashboard::summary(id, "range").starts_with(prefix));
    }

    #[test]
    fn test_list_pattern_matches_list_key() {
        let id = Uuid::new_v4();
        let key = academy::list(id, "locations", "deadbeef");
        let pattern = academy::list_pattern(id, "locations");
        assert!(key.starts_with(pattern.trim_end_matches('*')));
    }

    #[test]
    fn test_hash_filters_consistency() {
        let filters = ("padel", 2_i64, true);
        assert_eq!(hash_filters(&filters), hash_filters(&filters));
        assert_ne!(hash_filters(&filters), hash_filters(&("tennis", 2_i64, true)));
    }
}
