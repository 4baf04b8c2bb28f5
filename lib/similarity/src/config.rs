//! Engine configuration
//!
//! Every clustering call receives its parameters explicitly. Nothing here is
//! global, so independent calls can run concurrently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default cosine similarity required to join a cluster
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
/// Default cap on centroid refinement rounds
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
/// Threshold range recommended for interactive callers
pub const RECOMMENDED_THRESHOLD_RANGE: (f64, f64) = (0.3, 0.9);

/// Clustering parameters for a single call
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,

    #[serde(default)]
    pub strategy: ClusterStrategy,

    /// Hard cap on centroid rounds, not a convergence promise
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            strategy: ClusterStrategy::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl EngineConfig {
    pub fn new(similarity_threshold: f64, strategy: ClusterStrategy) -> Self {
        Self {
            similarity_threshold,
            strategy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Validate the configuration
    /// - Threshold must be finite and within [0, 1]
    /// - At least one centroid round is required
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.similarity_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::ThresholdOutOfRange(t));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }

    /// Copy with the threshold clamped to [`RECOMMENDED_THRESHOLD_RANGE`]
    #[must_use]
    pub fn with_recommended_clamp(mut self) -> Self {
        let (lo, hi) = RECOMMENDED_THRESHOLD_RANGE;
        if self.similarity_threshold.is_finite() {
            self.similarity_threshold = self.similarity_threshold.clamp(lo, hi);
        } else {
            self.similarity_threshold = DEFAULT_SIMILARITY_THRESHOLD;
        }
        self
    }
}

/// Clustering strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStrategy {
    /// Single pass, representative fixed at cluster creation
    #[default]
    Threshold,
    /// Iterative centroid refinement
    Kmeans,
}

impl ClusterStrategy {
    pub const ALL: [ClusterStrategy; 2] = [ClusterStrategy::Threshold, ClusterStrategy::Kmeans];

    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStrategy::Threshold => "threshold",
            ClusterStrategy::Kmeans => "kmeans",
        }
    }
}

impl fmt::Display for ClusterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threshold" => Ok(ClusterStrategy::Threshold),
            "kmeans" | "k-means" => Ok(ClusterStrategy::Kmeans),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Similarity threshold {0} must be within [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    #[error("Unknown clustering strategy '{0}' (expected 'threshold' or 'kmeans')")]
    UnknownStrategy(String),
}

impl From<ConfigError> for concursim_core::Error {
    fn from(err: ConfigError) -> Self {
        concursim_core::Error::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.similarity_threshold, 0.6);
        assert_eq!(config.strategy, ClusterStrategy::Threshold);
        assert_eq!(config.max_iterations, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"strategy": "kmeans"}"#).unwrap();
        assert_eq!(config.strategy, ClusterStrategy::Kmeans);
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_config_error_converts_to_invalid_config() {
        let err: concursim_core::Error = ConfigError::ZeroIterations.into();
        assert!(matches!(err, concursim_core::Error::InvalidConfig(_)));
        assert_eq!(err.to_string(), "Invalid configuration: max_iterations must be at least 1");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            EngineConfig::new(1.5, ClusterStrategy::Threshold).validate(),
            Err(ConfigError::ThresholdOutOfRange(1.5))
        );
        assert!(EngineConfig::new(f64::NAN, ClusterStrategy::Threshold).validate().is_err());
        assert_eq!(
            EngineConfig::default().with_max_iterations(0).validate(),
            Err(ConfigError::ZeroIterations)
        );
    }

    #[test]
    fn test_recommended_clamp() {
        assert_eq!(EngineConfig::new(0.1, ClusterStrategy::Threshold).with_recommended_clamp().similarity_threshold, 0.3);
        assert_eq!(EngineConfig::new(0.95, ClusterStrategy::Threshold).with_recommended_clamp().similarity_threshold, 0.9);
        assert_eq!(EngineConfig::new(0.5, ClusterStrategy::Threshold).with_recommended_clamp().similarity_threshold, 0.5);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("kmeans".parse::<ClusterStrategy>(), Ok(ClusterStrategy::Kmeans));
        assert_eq!(" Threshold ".parse::<ClusterStrategy>(), Ok(ClusterStrategy::Threshold));
        assert!("dbscan".parse::<ClusterStrategy>().is_err());
        assert_eq!(ClusterStrategy::Kmeans.to_string(), "kmeans");
    }
}
