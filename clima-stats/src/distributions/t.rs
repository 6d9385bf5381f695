//! Student's t distribution

use super::normal::normal_quantile;
use super::special::{gamma_ln, regularized_incomplete_beta};

/// Probability density of Student's t
pub fn t_pdf(x: f64, df: f64) -> f64 {
    // PDF(x) = Γ((ν+1)/2) / (√(νπ) * Γ(ν/2)) * (1 + x²/ν)^(-(ν+1)/2)
    let nu = df;
    let coef = gamma_ln((nu + 1.0) / 2.0) - gamma_ln(nu / 2.0) - 0.5 * (nu * std::f64::consts::PI).ln();
    let term = -(nu + 1.0) / 2.0 * (1.0 + x * x / nu).ln();
    (coef + term).exp()
}

/// Cumulative distribution P(T ≤ x)
pub fn t_cdf(x: f64, df: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let tail = 0.5 * regularized_incomplete_beta(df / 2.0, 0.5, df / (df + x * x));
    if x >= 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Two-tailed p-value P(|T| ≥ |t|)
///
/// Evaluated directly from the incomplete beta so small p-values keep
/// their precision. `t = ±f64::MAX` yields 0.
pub fn t_two_tailed_p(t: f64, df: f64) -> f64 {
    if df <= 0.0 || t.is_nan() {
        return 1.0;
    }
    regularized_incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0)
}

/// Quantile: the `x` with `t_cdf(x, df) = p`, for `0 < p < 1`
pub fn t_quantile(p: f64, df: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) || df <= 0.0 {
        return f64::NAN;
    }
    if p == 0.5 {
        return 0.0;
    }
    if p < 0.5 {
        return -t_quantile(1.0 - p, df);
    }

    // Bracket the root on [0, hi]
    let mut lo = 0.0;
    let mut hi = 1.0;
    while t_cdf(hi, df) < p && hi < 1e300 {
        lo = hi;
        hi *= 2.0;
    }

    // Newton from the normal approximation, falling back to bisection
    // whenever a step leaves the bracket
    let mut x = normal_quantile(p).clamp(lo, hi);
    for _ in 0..200 {
        let f = t_cdf(x, df) - p;
        if f == 0.0 {
            return x;
        }
        if f < 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let pdf = t_pdf(x, df);
        let newton = x - f / pdf;
        let next = if pdf > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - x).abs() <= 1e-13 * x.abs().max(1.0) {
            return next;
        }
        x = next;
    }

    x
}
