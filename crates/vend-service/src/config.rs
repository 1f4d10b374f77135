//! Service configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.

use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::time::Duration;

/// Order and reporting service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file path
    pub database_path: String,

    /// Cached report lifetime in seconds
    pub report_ttl_secs: u64,

    /// Reporting timezone as minutes east of UTC. Day boundaries for the
    /// daily report are computed in this offset.
    pub report_offset: FixedOffset,

    /// Upper bound on a single cache invalidation call
    pub invalidate_timeout: Duration,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let report_ttl_secs: u64 = env::var("VEND_REPORT_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .map_err(|_| ConfigError::InvalidValue("VEND_REPORT_TTL_SECS".to_string()))?;

        let offset_minutes: i32 = env::var("VEND_REPORT_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("VEND_REPORT_UTC_OFFSET_MINUTES".to_string()))?;

        let report_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue("VEND_REPORT_UTC_OFFSET_MINUTES".to_string())
        })?;

        let invalidate_timeout_ms: u64 = env::var("VEND_INVALIDATE_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("VEND_INVALIDATE_TIMEOUT_MS".to_string()))?;

        Ok(ServiceConfig {
            database_path: env::var("VEND_DATABASE_PATH")
                .unwrap_or_else(|_| "./vend.db".to_string()),
            report_ttl_secs,
            report_offset,
            invalidate_timeout: Duration::from_millis(invalidate_timeout_ms),
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: "./vend.db".to_string(),
            report_ttl_secs: 86_400,
            report_offset: Utc.fix(),
            invalidate_timeout: Duration::from_millis(2000),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.report_ttl_secs, 86_400);
        assert_eq!(config.report_offset.local_minus_utc(), 0);
    }
}
