//! Weight vector for the composite popularity score.

use serde::{Deserialize, Serialize};
use toolrank_common::ScoringConfig;

/// Weights of the two normalised signals.
/// Conventionally sum to 1.0; the composer does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    /// Bounded search-interest index (0–100, relative per request)
    pub trends: f64,
    /// Unbounded encyclopedia pageview counts
    pub pageviews: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            trends:    0.6,
            pageviews: 0.4,
        }
    }
}

impl From<&ScoringConfig> for SignalWeights {
    fn from(cfg: &ScoringConfig) -> Self {
        Self {
            trends: cfg.trends_weight,
            pageviews: cfg.pageviews_weight,
        }
    }
}

impl SignalWeights {
    pub fn new(trends: f64, pageviews: f64) -> Self {
        Self { trends, pageviews }
    }

    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.trends + self.pageviews - 1.0).abs() < 1e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = SignalWeights::default();
        assert!(w.validate(), "Default weights must sum to 1.0");
    }

    #[test]
    fn test_uneven_weights_fail_validation() {
        assert!(!SignalWeights::new(0.6, 0.6).validate());
        assert!(SignalWeights::new(1.0, 0.0).validate());
    }

    #[test]
    fn test_from_scoring_config() {
        let cfg = ScoringConfig { trends_weight: 0.7, pageviews_weight: 0.3 };
        assert_eq!(SignalWeights::from(&cfg), SignalWeights::new(0.7, 0.3));
    }
}
