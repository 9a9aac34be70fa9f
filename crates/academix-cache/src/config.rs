//! Redis cache configuration.

use std::env;

/// # Environment Variables
///
/// - `REDIS_URL`: connection URL (default `redis://127.0.0.1:6379`)
/// - `CACHE_ENABLED`: set to `false` to run without Redis (default `true`)
/// - `CACHE_TTL_SECONDS`: default TTL (default `300`)
/// - `CACHE_PREFIX`: namespace for every key (default `academix`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    pub redis_url: String,
    pub enabled: bool,
    pub default_ttl_seconds: u64,
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            enabled: env::var("CACHE_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.enabled),
            default_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_seconds),
            key_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            enabled: true,
            default_ttl_seconds: 300,
            key_prefix: "academix".into(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_ttl_seconds, 300);
        assert_eq!(config.key_prefix, "academix");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
        assert!(!parse_flag("0"));
    }
}
