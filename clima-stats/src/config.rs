//! Engine configuration
//!
//! The tunable policy of the engine. Significance level, confidence level and
//! effect-size cut points are fixed and live next to the code that uses them.

use serde::{Deserialize, Serialize};

/// Thresholds of the quadratic-vs-linear curvature check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonlinearityPolicy {
    /// |c / se(c)| must exceed this
    pub t_ratio_threshold: f64,
    /// Quadratic R² must beat linear R² by at least this much
    pub min_r2_gain: f64,
    /// Smallest sample the check runs on; values below 5 are raised to 5
    pub min_samples: usize,
    /// Log-linear fit wins the label when its R² is within this of the quadratic R²
    pub log_margin: f64,
}

impl Default for NonlinearityPolicy {
    fn default() -> Self {
        Self {
            t_ratio_threshold: 2.0,
            min_r2_gain: 0.05,
            min_samples: 5,
            log_margin: 0.01,
        }
    }
}

impl NonlinearityPolicy {
    pub const FLOOR_SAMPLES: usize = 5;

    pub fn effective_min_samples(&self) -> usize {
        self.min_samples.max(Self::FLOOR_SAMPLES)
    }
}

/// When the facade attaches human-readable warnings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningPolicy {
    pub small_sample: usize,
    pub very_small_sample: usize,
    /// |ρ − r| above this flags a Pearson/Spearman divergence
    pub rank_divergence: f64,
}

impl Default for WarningPolicy {
    fn default() -> Self {
        Self {
            small_sample: 10,
            very_small_sample: 5,
            rank_divergence: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub nonlinearity: NonlinearityPolicy,
    pub warnings: WarningPolicy,
    /// Points per prediction band
    pub band_grid_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nonlinearity: NonlinearityPolicy::default(),
            warnings: WarningPolicy::default(),
            band_grid_size: 30,
        }
    }
}
