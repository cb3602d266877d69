//! Engine configuration.
//!
//! Timing and bounding knobs for the engine session. Physics constants are not
//! configurable; they live next to the code that uses them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PolarResult, ValidationError};

/// Bounds applied to recorded rotation samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationHistoryConfig {
    /// Samples kept per element; the oldest are evicted first.
    pub max_samples_per_element: usize,
    /// Samples older than this are dropped by `RotationHistory::prune_older_than`.
    pub max_sample_age_secs: Option<u64>,
}

impl Default for RotationHistoryConfig {
    fn default() -> Self {
        Self {
            max_samples_per_element: 64,
            max_sample_age_secs: None,
        }
    }
}

/// Runtime configuration for a `PolarizationEngine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing-edge delay before a discovery pass runs.
    pub discovery_debounce_ms: u64,
    /// Trailing-edge delay before an encoding pass runs.
    pub encoding_debounce_ms: u64,
    /// Rotation history bounds.
    pub history: RotationHistoryConfig,
    /// Command queue capacity of `EngineRuntime`.
    pub runtime_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            discovery_debounce_ms: 200,
            encoding_debounce_ms: 1000,
            history: RotationHistoryConfig::default(),
            runtime_queue_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Discovery debounce as a `Duration`.
    #[must_use]
    pub const fn discovery_debounce(&self) -> Duration {
        Duration::from_millis(self.discovery_debounce_ms)
    }

    /// Encoding debounce as a `Duration`.
    #[must_use]
    pub const fn encoding_debounce(&self) -> Duration {
        Duration::from_millis(self.encoding_debounce_ms)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> PolarResult<()> {
        if self.discovery_debounce_ms == 0 {
            return Err(invalid("discovery_debounce_ms must be > 0".to_string()));
        }
        if self.encoding_debounce_ms == 0 {
            return Err(invalid("encoding_debounce_ms must be > 0".to_string()));
        }
        if self.history.max_samples_per_element == 0 {
            return Err(invalid(
                "history.max_samples_per_element must be >= 1".to_string(),
            ));
        }
        if self.history.max_sample_age_secs == Some(0) {
            return Err(invalid(
                "history.max_sample_age_secs must be > 0 when set".to_string(),
            ));
        }
        if self.runtime_queue_capacity == 0 {
            return Err(invalid("runtime_queue_capacity must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Load from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> PolarResult<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ValidationError::ConfigParse {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a JSON file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> PolarResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ValidationError::ConfigIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&raw)
    }
}

fn invalid(reason: String) -> crate::error::PolarError {
    ValidationError::InvalidConfig { reason }.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.discovery_debounce(), Duration::from_millis(200));
        assert_eq!(cfg.encoding_debounce(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = EngineConfig::from_json(r#"{"discovery_debounce_ms": 50}"#).unwrap();
        assert_eq!(cfg.discovery_debounce_ms, 50);
        assert_eq!(cfg.encoding_debounce_ms, 1000);
        assert_eq!(cfg.history.max_samples_per_element, 64);
    }

    #[test]
    fn test_nested_history_config() {
        let cfg = EngineConfig::from_json(
            r#"{"history": {"max_samples_per_element": 8, "max_sample_age_secs": 30}}"#,
        )
        .unwrap();
        assert_eq!(cfg.history.max_samples_per_element, 8);
        assert_eq!(cfg.history.max_sample_age_secs, Some(30));
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let err = EngineConfig::from_json(r#"{"encoding_debounce_ms": 0}"#).unwrap_err();
        assert!(err.is_validation());
        assert!(format!("{err}").contains("encoding_debounce_ms"));
    }

    #[test]
    fn test_zero_history_bound_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.history.max_samples_per_element = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"runtime_queue_capacity": 4}"#).unwrap();

        let cfg = EngineConfig::from_file(&path).unwrap();
        assert_eq!(cfg.runtime_queue_capacity, 4);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err}").contains("absent.json"));
    }
}
