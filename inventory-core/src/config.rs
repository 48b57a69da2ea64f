//! Configuration types

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot lifetime used when no configuration is supplied (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Configuration for the cached inventory service.
///
/// The TTL is fixed for the lifetime of a cache instance; there is no
/// runtime setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a snapshot may be served before the next read refreshes it.
    #[serde(default = "default_ttl")]
    pub ttl: Duration,
}

fn default_ttl() -> Duration {
    DEFAULT_CACHE_TTL
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Validate the configuration.
    ///
    /// A zero TTL would expire the snapshot on every read and is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "ttl".to_string(),
                value: format!("{:?}", self.ttl),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_five_minutes() {
        assert_eq!(CacheConfig::default().ttl, Duration::from_secs(300));
        assert_eq!(CacheConfig::new(), CacheConfig::default());
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new().with_ttl(Duration::from_millis(250));
        assert_eq!(config.ttl, Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let err = CacheConfig::new()
            .with_ttl(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "ttl"));
    }

    #[test]
    fn test_missing_ttl_deserializes_to_default() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ttl, DEFAULT_CACHE_TTL);

        let config: CacheConfig =
            serde_json::from_str(r#"{"ttl":{"secs":30,"nanos":0}}"#).unwrap();
        assert_eq!(config.ttl, Duration::from_secs(30));
    }
}
