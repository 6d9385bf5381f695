//! Curvature check: linear fit vs quadratic fit on the same data
//!
//! Fits `y = a + b·u + c·u²` on standardized `u = (x - x̄)/s` by solving the
//! 3×3 normal equations with a Cholesky factorization. Never fails: samples
//! too small or with fewer than three distinct x values get a linear-only
//! report.

use crate::config::NonlinearityPolicy;
use crate::helpers::{guarded_ratio, mean, Moments};
use crate::validate::SamplePair;
use clima_core::finite::saturate;
use clima_core::{NonlinearityReport, RegressionStatistics, TransformLabel};
use nalgebra::{Matrix3, Vector3};

/// Quadratic OLS fit in untransformed x units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    /// Coefficient of x²
    pub curvature: f64,
    /// Curvature over its standard error
    pub t_ratio: f64,
    pub r_squared: f64,
}

pub fn detect_nonlinearity(
    sample: &SamplePair,
    linear: &RegressionStatistics,
    policy: &NonlinearityPolicy,
) -> NonlinearityReport {
    let x = sample.x();
    let y = sample.y();
    let linear_r2 = linear.r_squared;

    if sample.len() < policy.effective_min_samples() || distinct_count(x) < 3 {
        return NonlinearityReport::linear_only(linear_r2);
    }
    let Some(fit) = fit_quadratic(x, y) else {
        tracing::trace!("quadratic normal equations not positive definite");
        return NonlinearityReport::linear_only(linear_r2);
    };

    let gain = fit.r_squared - linear_r2;
    let is_nonlinear = fit.t_ratio.abs() > policy.t_ratio_threshold && gain >= policy.min_r2_gain;

    let optimal_transform = if is_nonlinear {
        choose_transform(x, y, linear, &fit, policy)
    } else {
        TransformLabel::None
    };

    tracing::trace!(
        t_ratio = fit.t_ratio,
        gain,
        is_nonlinear,
        transform = optimal_transform.as_str(),
        "nonlinearity check"
    );

    NonlinearityReport {
        is_nonlinear,
        curvature: fit.curvature,
        optimal_transform,
        t_ratio: fit.t_ratio,
        linear_r2,
        quadratic_r2: Some(fit.r_squared),
    }
}

/// Least-squares quadratic; `None` when the design matrix is singular
pub fn fit_quadratic(x: &[f64], y: &[f64]) -> Option<QuadraticFit> {
    let n = x.len();
    if n < 4 {
        return None;
    }
    let mean_x = mean(x);
    let mean_y = mean(y);
    let spread = (x.iter().map(|v| (v - mean_x).powi(2)).sum::<f64>() / n as f64).sqrt();
    if spread == 0.0 {
        return None;
    }

    let mut xtx = Matrix3::<f64>::zeros();
    let mut xty = Vector3::<f64>::zeros();
    for (xi, yi) in x.iter().zip(y.iter()) {
        let u = (xi - mean_x) / spread;
        let row = Vector3::new(1.0, u, u * u);
        xtx += row * row.transpose();
        xty += row * *yi;
    }

    let cholesky = xtx.cholesky()?;
    let beta = cholesky.solve(&xty);
    let inverse = cholesky.inverse();

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let u = (xi - mean_x) / spread;
        let fitted = beta[0] + beta[1] * u + beta[2] * u * u;
        ss_res += (yi - fitted).powi(2);
        ss_tot += (yi - mean_y).powi(2);
    }
    if ss_tot == 0.0 {
        return None;
    }

    let sigma2 = ss_res / (n - 3) as f64;
    let se_c = (sigma2 * inverse[(2, 2)]).max(0.0).sqrt();

    Some(QuadraticFit {
        curvature: saturate(beta[2] / (spread * spread)),
        t_ratio: guarded_ratio(beta[2], se_c),
        r_squared: (1.0 - ss_res / ss_tot).clamp(0.0, 1.0),
    })
}

/// Coarse label from the residual shape of the linear fit
///
/// `none` unless the x-ordered residuals bow (outer thirds and middle third
/// on opposite sides of zero). A bow that a log-linear fit explains about as
/// well as the quadratic, and that bends against the slope, is `log`.
fn choose_transform(
    x: &[f64],
    y: &[f64],
    linear: &RegressionStatistics,
    fit: &QuadraticFit,
    policy: &NonlinearityPolicy,
) -> TransformLabel {
    if !residuals_bow(x, y, linear) {
        return TransformLabel::None;
    }

    if x.iter().all(|v| *v > 0.0) && fit.curvature.signum() != linear.slope.signum() {
        let log_x: Vec<f64> = x.iter().map(|v| v.ln()).collect();
        let log_r2 = Moments::of(&log_x, y).pearson_r().powi(2);
        if log_r2 >= fit.r_squared - policy.log_margin {
            return TransformLabel::Log;
        }
    }

    TransformLabel::Quadratic
}

fn residuals_bow(x: &[f64], y: &[f64], linear: &RegressionStatistics) -> bool {
    let mut residuals: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (*xi, yi - (linear.slope * xi + linear.intercept)))
        .collect();
    residuals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = residuals.len();
    let k = n / 3;
    if k == 0 {
        return false;
    }

    let ends: Vec<f64> = residuals[..k]
        .iter()
        .chain(residuals[n - k..].iter())
        .map(|(_, r)| *r)
        .collect();
    let middle: Vec<f64> = residuals[k..n - k].iter().map(|(_, r)| *r).collect();

    let ends_mean = mean(&ends);
    let middle_mean = mean(&middle);
    ends_mean * middle_mean < 0.0
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}
