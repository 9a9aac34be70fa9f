//! HTTP server and connection pool settings.

use std::env;

use crate::env_or;

/// # Environment Variables
///
/// - `SERVER_HOST`: bind host (default `0.0.0.0`)
/// - `SERVER_PORT`: bind port (default `3000`)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default `10`)
/// - `METRICS_ENABLED`: expose `/metrics` (default `true`)
/// - `LOG_DIR`: directory for rolling log files (default `storage/logs`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub metrics_enabled: bool,
    pub log_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_max_connections: 10,
            metrics_enabled: true,
            log_dir: "storage/logs".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env_or("SERVER_PORT", defaults.port),
            database_max_connections: env_or(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            metrics_enabled: env::var("METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.metrics_enabled),
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_address() {
        assert_eq!(ServerConfig::default().bind_address(), "0.0.0.0:3000");
    }
}
