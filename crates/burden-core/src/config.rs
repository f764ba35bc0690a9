//! Engine configuration.
//!
//! Scoring weights and perturbation multipliers are fixed constants of the
//! model. Only row-tolerance policy and the CQ3 comparability thresholds are
//! configurable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::records::NumericPolicy;

/// Thresholds a mechanism family must meet to be comparable with others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparabilityThresholds {
    /// Minimum distinct cost types observed for the family
    pub min_cost_types: usize,

    /// Minimum distinct stakeholders bearing the family's costs
    pub min_stakeholders: usize,
}

impl Default for ComparabilityThresholds {
    fn default() -> Self {
        Self {
            min_cost_types: 5,
            min_stakeholders: 2,
        }
    }
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Treatment of malformed numeric fields
    pub numeric_policy: NumericPolicy,

    /// CQ3 comparability rule
    pub comparability: ComparabilityThresholds,
}

impl EngineConfig {
    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Override the numeric policy.
    pub fn with_numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.numeric_policy = policy;
        self
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.comparability.min_cost_types == 0 {
            return Err(EngineError::InvalidConfig(
                "comparability.min_cost_types must be at least 1".to_string(),
            ));
        }
        if self.comparability.min_stakeholders == 0 {
            return Err(EngineError::InvalidConfig(
                "comparability.min_stakeholders must be at least 1".to_string(),
            ));
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
        assert_eq!(config.numeric_policy, NumericPolicy::Coerce);
        assert_eq!(config.comparability.min_cost_types, 5);
        assert_eq!(config.comparability.min_stakeholders, 2);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml("numeric_policy: exclude\n").unwrap();
        assert_eq!(config.numeric_policy, NumericPolicy::Exclude);
        assert_eq!(config.comparability, ComparabilityThresholds::default());
    }

    #[test]
    fn test_thresholds_override() {
        let yaml = r#"
comparability:
  min_cost_types: 3
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.comparability.min_cost_types, 3);
        assert_eq!(config.comparability.min_stakeholders, 2);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let yaml = r#"
comparability:
  min_stakeholders: 0
"#;
        assert!(matches!(
            EngineConfig::from_yaml(yaml),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            EngineConfig::from_yaml("perturbation: 0.5\n"),
            Err(EngineError::Yaml(_))
        ));
    }
}
