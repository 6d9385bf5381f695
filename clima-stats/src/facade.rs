//! Statistics facade: one combined record per dimension pair
//!
//! The only entry point callers need. Validation runs first; after it passes
//! every component runs to completion, so a call either returns a complete
//! record or the first violated precondition.

use crate::bands::generate_bands;
use crate::config::{EngineConfig, WarningPolicy};
use crate::correlation::correlate;
use crate::nonlinear::detect_nonlinearity;
use crate::regression::regress;
use crate::validate::SamplePair;
use clima_core::{
    CombinedStatistics, CorrelationStatistics, NonlinearityReport, PredictionBandPoint,
    RegressionStatistics, StatsError,
};
use std::fmt;

// ============ Warnings ============

/// Human-readable flag attached to a combined record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Warning {
    SmallSample { threshold: usize },
    VerySmallSample { threshold: usize },
    NotSignificant,
    RankDivergence { pearson: f64, spearman: f64 },
    Nonlinear,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SmallSample { threshold } => {
                write!(f, "n < {}: wide confidence intervals", threshold)
            }
            Warning::VerySmallSample { threshold } => {
                write!(f, "n < {}: results are highly unstable", threshold)
            }
            Warning::NotSignificant => write!(f, "correlation is not statistically significant (p ≥ 0.05)"),
            Warning::RankDivergence { pearson, spearman } => write!(
                f,
                "Pearson r ({:.2}) and Spearman ρ ({:.2}) diverge: outliers or a monotonic nonlinear relationship",
                pearson, spearman
            ),
            Warning::Nonlinear => write!(f, "possible nonlinear relationship detected"),
        }
    }
}

/// Warnings in fixed order: sample size, significance, rank divergence, curvature
pub fn collect_warnings(
    correlation: &CorrelationStatistics,
    nonlinearity: &NonlinearityReport,
    policy: &WarningPolicy,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if correlation.n < policy.small_sample {
        warnings.push(Warning::SmallSample { threshold: policy.small_sample });
    }
    if correlation.n < policy.very_small_sample {
        warnings.push(Warning::VerySmallSample { threshold: policy.very_small_sample });
    }
    if !correlation.is_significant {
        warnings.push(Warning::NotSignificant);
    }
    if (correlation.spearman_rho - correlation.pearson_r).abs() > policy.rank_divergence {
        warnings.push(Warning::RankDivergence {
            pearson: correlation.pearson_r,
            spearman: correlation.spearman_rho,
        });
    }
    if nonlinearity.is_nonlinear {
        warnings.push(Warning::Nonlinear);
    }

    warnings
}

// ============ Engine ============

/// Stateless engine carrying its tunable policy
#[derive(Debug, Clone, Default)]
pub struct StatisticsEngine {
    config: EngineConfig,
}

impl StatisticsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Full statistics for one pair, or the first failed precondition
    pub fn compute(&self, x: &[f64], y: &[f64]) -> Result<CombinedStatistics, StatsError> {
        let sample = SamplePair::new(x, y)?;

        let correlation = correlate(&sample);
        let regression = regress(&sample);
        let nonlinearity = detect_nonlinearity(&sample, &regression, &self.config.nonlinearity);
        let warnings = collect_warnings(&correlation, &nonlinearity, &self.config.warnings)
            .iter()
            .map(Warning::to_string)
            .collect::<Vec<_>>();

        tracing::debug!(
            n = correlation.n,
            r = correlation.pearson_r,
            p = correlation.p_value,
            r_squared = regression.r_squared,
            warnings = warnings.len(),
            "computed statistics"
        );

        Ok(CombinedStatistics {
            correlation,
            regression,
            nonlinearity,
            warnings,
        })
    }

    /// Prediction band on the configured grid
    pub fn bands(&self, x: &[f64], regression: &RegressionStatistics) -> Vec<PredictionBandPoint> {
        generate_bands(x, regression, self.config.band_grid_size)
    }
}

/// [`StatisticsEngine::compute`] with the default configuration
pub fn compute_full_statistics(x: &[f64], y: &[f64]) -> Result<CombinedStatistics, StatsError> {
    StatisticsEngine::default().compute(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clima_core::{Axis, ErrorKind};

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_perfect_positive_line() {
            let stats =
                compute_full_statistics(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
            assert!((stats.correlation.pearson_r - 1.0).abs() < 1e-12);
            assert!((stats.regression.slope - 2.0).abs() < 1e-12);
            assert!(stats.regression.intercept.abs() < 1e-12);
            assert!((stats.regression.r_squared - 1.0).abs() < 1e-12);
            assert!(stats.validate().is_ok());
        }

        #[test]
        fn test_perfect_negative_line() {
            let stats =
                compute_full_statistics(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();
            assert!((stats.correlation.pearson_r + 1.0).abs() < 1e-12);
            assert!((stats.regression.slope + 1.0).abs() < 1e-12);
        }

        #[test]
        fn test_constant_x_is_degenerate() {
            let err = compute_full_statistics(&[1.0, 1.0, 1.0, 1.0], &[2.0, 3.0, 4.0, 5.0]).unwrap_err();
            assert_eq!(err, StatsError::DegenerateInput { axis: Axis::X });
        }

        #[test]
        fn test_large_magnitudes_give_valid_record() {
            let x = [1e100, 2e100, 3e100, 4e100];
            let stats = compute_full_statistics(&x, &[1e100, 2e100, 3e100, 4.5e100]).unwrap();
            assert!((stats.correlation.pearson_r - 0.994_376_7).abs() < 1e-6);
            assert!(stats.validate().is_ok());

            let same = compute_full_statistics(&x, &x).unwrap();
            assert!((same.correlation.pearson_r - 1.0).abs() < 1e-12);
            assert!(same.validate().is_ok());
        }

        #[test]
        fn test_unrepresentable_spread_is_degenerate() {
            let huge = [1e160, 2e160, 3e160, 4e160];
            let err = compute_full_statistics(&huge, &huge).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DegenerateInput);

            let tiny = [1e-200, 2e-200, 3e-200, 4e-200];
            let err = compute_full_statistics(&tiny, &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
            assert_eq!(err, StatsError::DegenerateInput { axis: Axis::X });
        }

        #[test]
        fn test_two_points_is_insufficient() {
            let err = compute_full_statistics(&[1.0, 2.0], &[1.0, 2.0]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InsufficientData);
        }

        #[test]
        fn test_three_points_full_range_ci() {
            let stats = compute_full_statistics(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();
            let ci = stats.correlation.confidence_interval;
            assert_eq!((ci.lower, ci.upper), (-1.0, 1.0));
            let json = serde_json::to_value(&stats).unwrap();
            assert_eq!(json["correlation"]["confidenceInterval"]["lower"], -1.0);
            assert!(stats.validate().is_ok());
        }
    }

    mod warning_tests {
        use super::*;

        #[test]
        fn test_small_sample_warnings_in_order() {
            let stats = compute_full_statistics(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]).unwrap();
            assert_eq!(stats.warnings[0], "n < 10: wide confidence intervals");
            assert_eq!(stats.warnings[1], "n < 5: results are highly unstable");
            assert!(stats.warnings[2].starts_with("correlation is not statistically significant"));
        }

        #[test]
        fn test_nonlinear_warning() {
            let x: Vec<f64> = (-6..=6).map(f64::from).collect();
            let y: Vec<f64> = x.iter().map(|v| v * v).collect();
            let stats = compute_full_statistics(&x, &y).unwrap();
            assert!(stats.nonlinearity.is_nonlinear);
            assert_eq!(
                stats.warnings.last().map(String::as_str),
                Some("possible nonlinear relationship detected")
            );
        }

        #[test]
        fn test_rank_divergence() {
            // One outlier drags Pearson far from Spearman
            let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
            let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, -40.0];
            let stats = compute_full_statistics(&x, &y).unwrap();
            assert!(stats.warnings.iter().any(|w| w.starts_with("Pearson r")));
        }

        #[test]
        fn test_no_warnings_for_clean_large_sample() {
            let x: Vec<f64> = (1..=20).map(f64::from).collect();
            let y: Vec<f64> = x.iter().map(|v| 0.5 * v + if *v as i32 % 2 == 0 { 0.3 } else { -0.3 }).collect();
            let stats = compute_full_statistics(&x, &y).unwrap();
            assert!(stats.warnings.is_empty(), "{:?}", stats.warnings);
        }

        #[test]
        fn test_custom_thresholds() {
            let mut config = EngineConfig::default();
            config.warnings.small_sample = 3;
            config.warnings.very_small_sample = 3;
            let engine = StatisticsEngine::new(config);
            let stats = engine.compute(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.5]).unwrap();
            assert!(stats.warnings.iter().all(|w| !w.starts_with("n <")));
        }
    }

    mod engine_tests {
        use super::*;

        #[test]
        fn test_idempotent() {
            let x = [2.3, 4.1, 1.7, 8.8, 5.2, 6.6, 3.3];
            let y = [1.1, 2.9, 0.4, 5.5, 3.0, 3.8, 2.2];
            let first = compute_full_statistics(&x, &y).unwrap();
            let second = compute_full_statistics(&x, &y).unwrap();
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }

        #[test]
        fn test_bands_use_configured_grid() {
            let engine = StatisticsEngine::new(EngineConfig { band_grid_size: 12, ..Default::default() });
            let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
            let y = [1.5, 1.9, 3.4, 3.9, 5.2, 5.8];
            let stats = engine.compute(&x, &y).unwrap();
            assert_eq!(engine.bands(&x, &stats.regression).len(), 12);
        }

        #[test]
        fn test_r_squared_identity() {
            let x = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0, 3.0];
            let y = [3.0, 6.5, 2.0, 9.9, 4.4, 8.1, 5.0];
            let stats = compute_full_statistics(&x, &y).unwrap();
            let r = stats.correlation.pearson_r;
            assert!((stats.regression.r_squared - r * r).abs() < 1e-9);
            assert!(stats.regression.adjusted_r_squared <= stats.regression.r_squared);
            assert!(stats.validate().is_ok());
        }
    }
}
