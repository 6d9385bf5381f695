//! Confidence and prediction bands around a fitted line

use crate::distributions::t_critical_95;
use crate::helpers::{linspace, mean, min_max, sum_squared_deviations};
use clima_core::finite::saturate;
use clima_core::{PredictionBandPoint, RegressionStatistics};

/// Band over `grid_size` evenly spaced points spanning `[min(x), max(x)]`
///
/// Pure function of its inputs. Returns an empty band when `x` could not have
/// produced `regression` (fewer than 3 values, non-finite values, a spread
/// of zero or one that does not fit in an f64).
pub fn generate_bands(
    x: &[f64],
    regression: &RegressionStatistics,
    grid_size: usize,
) -> Vec<PredictionBandPoint> {
    let n = x.len();
    if n < 3 || x.iter().any(|v| !v.is_finite()) {
        return Vec::new();
    }
    let sxx = sum_squared_deviations(x);
    if !sxx.is_normal() {
        return Vec::new();
    }

    let mean_x = mean(x);
    let (lo, hi) = min_max(x);
    let t_crit = t_critical_95((n - 2) as f64);
    let scale = t_crit * regression.standard_error_estimate;
    let inv_n = 1.0 / n as f64;

    linspace(lo, hi, grid_size)
        .into_iter()
        .map(|x0| {
            let predicted = regression.slope * x0 + regression.intercept;
            let leverage = inv_n + (x0 - mean_x).powi(2) / sxx;
            let ci = saturate(scale * leverage.sqrt());
            let pi = saturate(scale * (1.0 + leverage).sqrt());
            PredictionBandPoint {
                x: x0,
                predicted: saturate(predicted),
                lower_ci: saturate(predicted - ci),
                upper_ci: saturate(predicted + ci),
                lower_pi: saturate(predicted - pi),
                upper_pi: saturate(predicted + pi),
            }
        })
        .collect()
}
