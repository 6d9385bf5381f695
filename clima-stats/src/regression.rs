//! Ordinary least squares regression of y on x

use crate::correlation::ALPHA;
use crate::distributions::{f_upper_tail, t_critical_95, t_two_tailed_p};
use crate::helpers::{guarded_ratio, Moments};
use crate::validate::SamplePair;
use clima_core::finite::saturate;
use clima_core::{Interval, PointInterval, RegressionStatistics};

/// Fit `y = slope·x + intercept` on a validated pair
pub fn regress(sample: &SamplePair) -> RegressionStatistics {
    let x = sample.x();
    let y = sample.y();
    let m = Moments::of(x, y);
    let n = m.n as f64;
    let df = (m.n - 2) as f64;

    let slope = m.sxy / m.sxx;
    let intercept = m.mean_y - slope * m.mean_x;

    let mut ss_res = 0.0;
    let mut ss_reg = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let fitted = slope * xi + intercept;
        ss_res += (yi - fitted) * (yi - fitted);
        ss_reg += (fitted - m.mean_y) * (fitted - m.mean_y);
    }

    let r_squared = (1.0 - ss_res / m.syy).clamp(0.0, 1.0);
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n - 1.0) / df;

    let mse = ss_res / df;
    let see = mse.sqrt();
    // Σx²/(n·Sxx) = 1/n + x̄²/Sxx, without squaring raw x
    let intercept_leverage = 1.0 / n + (m.mean_x / m.sxx.sqrt()).powi(2);
    let standard_error_slope = saturate(see / m.sxx.sqrt());
    let standard_error_intercept = saturate(see * intercept_leverage.sqrt());

    let t_statistic_slope = guarded_ratio(slope, standard_error_slope);
    let t_statistic_intercept = guarded_ratio(intercept, standard_error_intercept);
    let p_value_slope = t_two_tailed_p(t_statistic_slope, df);

    let t_crit = t_critical_95(df);
    let slope_ci = bounded_interval(slope, t_crit * standard_error_slope);
    let intercept_ci = bounded_interval(intercept, t_crit * standard_error_intercept);

    let f_statistic = guarded_ratio(ss_reg, mse);
    let p_value_model = f_upper_tail(f_statistic, 1.0, df);

    // New observation at x̄: ŷ = ȳ, se = s·√(1 + 1/n)
    let pi = bounded_interval(m.mean_y, t_crit * see * (1.0 + 1.0 / n).sqrt());

    tracing::trace!(slope, intercept, ss_res, ss_reg, t_crit, "regression fit");

    RegressionStatistics {
        slope,
        intercept,
        standard_error_slope,
        standard_error_intercept,
        t_statistic_slope,
        t_statistic_intercept,
        p_value_slope,
        slope_significant: p_value_slope < ALPHA,
        slope_ci,
        intercept_ci,
        r_squared,
        adjusted_r_squared,
        standard_error_estimate: see,
        f_statistic,
        p_value_model,
        prediction_interval: PointInterval {
            lower: pi.lower,
            upper: pi.upper,
            at_x: m.mean_x,
        },
        equation: format_equation(slope, intercept),
    }
}

/// `center ± half_width` with both ends kept finite
fn bounded_interval(center: f64, half_width: f64) -> Interval {
    let half_width = saturate(half_width);
    Interval::new(saturate(center - half_width), saturate(center + half_width))
}

/// `y = 1.23x + 4.56`, both coefficients rounded to 2 decimals
pub fn format_equation(slope: f64, intercept: f64) -> String {
    let intercept_text = two_decimals(intercept);
    match intercept_text.strip_prefix('-') {
        Some(magnitude) => format!("y = {}x - {}", two_decimals(slope), magnitude),
        None => format!("y = {}x + {}", two_decimals(slope), intercept_text),
    }
}

fn two_decimals(value: f64) -> String {
    let text = format!("{:.2}", value);
    if text == "-0.00" {
        "0.00".to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(x: &[f64], y: &[f64]) -> RegressionStatistics {
        regress(&SamplePair::new(x, y).unwrap())
    }

    #[test]
    fn test_perfect_line() {
        let r = fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(r.slope, 2.0);
        assert_eq!(r.intercept, 0.0);
        assert_eq!(r.r_squared, 1.0);
        assert_eq!(r.standard_error_estimate, 0.0);
        assert_eq!(r.t_statistic_slope, f64::MAX);
        assert_eq!(r.p_value_slope, 0.0);
        assert!(r.slope_significant);
        assert_eq!(r.slope_ci, Interval::new(2.0, 2.0));
        assert_eq!(r.equation, "y = 2.00x + 0.00");
    }

    #[test]
    fn test_negative_line() {
        let r = fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(r.slope, -1.0);
        assert_eq!(r.intercept, 6.0);
        assert_eq!(r.equation, "y = -1.00x + 6.00");
    }

    #[test]
    fn test_known_fit() {
        let r = fit(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0]);
        assert!((r.slope - 0.6).abs() < 1e-12);
        assert!((r.intercept - 2.2).abs() < 1e-12);
        assert!((r.r_squared - 0.6).abs() < 1e-12);
        assert!((r.adjusted_r_squared - 0.466_666_666_7).abs() < 1e-9);
        assert!((r.standard_error_estimate - 0.894_427_191).abs() < 1e-9);
        assert!((r.standard_error_slope - 0.282_842_712_5).abs() < 1e-9);
        assert!((r.standard_error_intercept - 0.938_083_151_9).abs() < 1e-9);
        assert!((r.t_statistic_intercept - 2.345_207_879_9).abs() < 1e-9);
        assert!((r.f_statistic - 4.5).abs() < 1e-9);
        assert!((r.slope_ci.lower - -0.300_124).abs() < 1e-3);
        assert!((r.slope_ci.upper - 1.500_124).abs() < 1e-3);
        assert_eq!(r.prediction_interval.at_x, 3.0);
        assert!((r.prediction_interval.lower - 0.881_852).abs() < 1e-3);
        assert!((r.prediction_interval.upper - 7.118_148).abs() < 1e-3);
        assert_eq!(r.equation, "y = 0.60x + 2.20");
    }

    #[test]
    fn test_far_from_origin_stays_finite() {
        // Σx² overflows here, Sxx does not
        let x = [1e155, 1e155 + 4e140, 1e155 + 8e140, 1e155 + 1.6e141];
        let r = fit(&x, &[1.0, 2.0, 3.0, 4.5]);
        assert!(x.iter().map(|v| v * v).sum::<f64>().is_infinite());
        assert!(r.slope.is_finite() && r.slope > 0.0);
        assert!(r.standard_error_intercept.is_finite());
        assert!(r.standard_error_intercept > 0.0);
        assert!(r.intercept_ci.contains(r.intercept));
    }

    #[test]
    fn test_large_magnitudes_keep_r_squared() {
        let r = fit(&[1e100, 2e100, 3e100, 4e100], &[1e100, 2e100, 3e100, 4.5e100]);
        assert!((r.r_squared - 0.988_785_046_7).abs() < 1e-9);
        assert!((r.slope - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_f_test_matches_slope_t_test() {
        let r = fit(&[1.0, 3.0, 4.0, 6.0, 8.0, 9.0], &[2.1, 2.9, 4.2, 4.8, 7.5, 7.0]);
        assert!((r.f_statistic - r.t_statistic_slope.powi(2)).abs() < 1e-8 * r.f_statistic);
        assert!((r.p_value_model - r.p_value_slope).abs() < 1e-9);
    }

    #[test]
    fn test_adjusted_never_exceeds_r_squared() {
        let r = fit(&[1.0, 2.0, 3.0], &[3.0, 1.0, 2.0]);
        assert!(r.adjusted_r_squared <= r.r_squared);
    }

    #[test]
    fn test_format_equation_signs() {
        assert_eq!(format_equation(1.5, -0.3), "y = 1.50x - 0.30");
        assert_eq!(format_equation(-0.004, -0.001), "y = 0.00x + 0.00");
        assert_eq!(format_equation(0.126, 10.0), "y = 0.13x + 10.00");
    }
}
