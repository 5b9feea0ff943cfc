//! Tunable parameters of a recommendation query.
//!
//! Every number the aggregator depends on lives here with a documented
//! default instead of being embedded in the algorithm.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use similarity::DEFAULT_MIN_COMMON_RATINGS;
use std::path::Path;

/// Default number of neighbors consulted per query
pub const DEFAULT_NEIGHBOR_COUNT: usize = 8;

/// Default minimum number of neighbors that must have rated an item
pub const DEFAULT_MIN_SUPPORTING_USERS: usize = 1;

/// Default centering constant, the midpoint of a 1-10 scale plus 0.5
pub const DEFAULT_BIAS: f64 = 5.5;

/// Default minimum sum of |similarity| behind a recommended item
pub const DEFAULT_MIN_WEIGHT_SUM: f64 = 1.0;

/// Parameters for `Recommender`.
///
/// Deserializes from partial JSON: missing fields take their defaults, so a
/// config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Shared items required before two users are correlated
    pub min_common_ratings: usize,
    /// How many neighbors (by |correlation|) to aggregate over
    pub neighbor_count: usize,
    /// Items rated by fewer neighbors than this are dropped
    pub min_supporting_users: usize,
    /// Subtracted from every neighbor rating before weighting. Assumes a
    /// roughly 1-10 scale; adjust for other scales.
    pub bias: f64,
    /// Items whose summed |similarity| is below this are dropped
    pub min_weight_sum: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            min_common_ratings: DEFAULT_MIN_COMMON_RATINGS,
            neighbor_count: DEFAULT_NEIGHBOR_COUNT,
            min_supporting_users: DEFAULT_MIN_SUPPORTING_USERS,
            bias: DEFAULT_BIAS,
            min_weight_sum: DEFAULT_MIN_WEIGHT_SUM,
        }
    }
}

impl RecommendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a JSON file, e.g. `{ "neighbor_count": 12 }`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn with_min_common_ratings(mut self, min: usize) -> Self {
        self.min_common_ratings = min;
        self
    }

    pub fn with_neighbor_count(mut self, count: usize) -> Self {
        self.neighbor_count = count;
        self
    }

    pub fn with_min_supporting_users(mut self, min: usize) -> Self {
        self.min_supporting_users = min;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_min_weight_sum(mut self, min: f64) -> Self {
        self.min_weight_sum = min;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecommendConfig::default();
        assert_eq!(config.min_common_ratings, 2);
        assert_eq!(config.neighbor_count, 8);
        assert_eq!(config.min_supporting_users, 1);
        assert_eq!(config.bias, 5.5);
        assert_eq!(config.min_weight_sum, 1.0);
    }

    #[test]
    fn test_builder() {
        let config = RecommendConfig::new()
            .with_neighbor_count(3)
            .with_min_supporting_users(2)
            .with_bias(3.0);
        assert_eq!(config.neighbor_count, 3);
        assert_eq!(config.min_supporting_users, 2);
        assert_eq!(config.bias, 3.0);
        assert_eq!(config.min_common_ratings, 2);
    }

    #[test]
    fn test_partial_json() {
        let config: RecommendConfig =
            serde_json::from_str(r#"{ "neighbor_count": 12, "bias": 3.0 }"#).unwrap();
        assert_eq!(config.neighbor_count, 12);
        assert_eq!(config.bias, 3.0);
        assert_eq!(config.min_supporting_users, DEFAULT_MIN_SUPPORTING_USERS);
    }

    #[test]
    fn test_missing_config_file() {
        let err = RecommendConfig::from_json_file(Path::new("no/such/config.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
