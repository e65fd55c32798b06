//! Engine configuration
//!
//! Limits applied while parsing and caching conditions. Campaign services
//! usually ship these as JSON next to their other settings.

use crate::error::{ConditionError, Result};
use serde::{Deserialize, Serialize};

/// Default parenthesis nesting / tree height limit
pub const DEFAULT_MAX_DEPTH: usize = 256;
/// Default maximum condition source length in bytes
pub const DEFAULT_MAX_SOURCE_LEN: usize = 64 * 1024;
/// Default number of parsed conditions kept by a cache
pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

/// Hard ceiling on `max_depth`; parsing and evaluation recurse once per level
pub const MAX_DEPTH_LIMIT: usize = 512;
/// Hard ceiling on `cache_capacity`
pub const MAX_CACHE_CAPACITY: usize = 1 << 20;

/// Parser and cache limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest parenthesis nesting and tallest expression tree accepted
    pub max_depth: usize,
    /// Longest condition source accepted, in bytes
    pub max_source_len: usize,
    /// Parsed conditions a cache keeps before it stops admitting new ones
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Deserialize and validate a JSON config; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| ConditionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ConditionError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConditionError::InvalidConfig(format!(
                "max_depth {} exceeds limit {}",
                self.max_depth, MAX_DEPTH_LIMIT
            )));
        }
        if self.max_source_len == 0 {
            return Err(ConditionError::InvalidConfig(
                "max_source_len must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity > MAX_CACHE_CAPACITY {
            return Err(ConditionError::InvalidConfig(format!(
                "cache_capacity {} exceeds limit {}",
                self.cache_capacity, MAX_CACHE_CAPACITY
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.max_source_len, 65536);
        assert_eq!(config.cache_capacity, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_depth": 32}"#).unwrap();
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.max_source_len, DEFAULT_MAX_SOURCE_LEN);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_empty_json_object() {
        assert_eq!(
            EngineConfig::from_json_str("{}").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"max_depth": 0}"#),
            Err(ConditionError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"max_depth": "deep"}"#),
            Err(ConditionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_limits_above_ceiling_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"max_depth": 1000000}"#),
            Err(ConditionError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"cache_capacity": 18446744073709551615}"#),
            Err(ConditionError::InvalidConfig(_))
        ));

        let at_ceiling = format!(
            r#"{{"max_depth": {}, "cache_capacity": {}}}"#,
            MAX_DEPTH_LIMIT, MAX_CACHE_CAPACITY
        );
        assert!(EngineConfig::from_json_str(&at_ceiling).is_ok());
    }

    #[test]
    fn test_zero_cache_capacity_is_allowed() {
        let config = EngineConfig::from_json_str(r#"{"cache_capacity": 0}"#).unwrap();
        assert_eq!(config.cache_capacity, 0);
    }
}
