//! F distribution

use super::special::regularized_incomplete_beta;

/// Cumulative distribution P(F ≤ x)
pub fn f_cdf(x: f64, d1: f64, d2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }

    // F CDF = I_{d1*x/(d1*x+d2)}(d1/2, d2/2)
    let z = d1 * x / (d1 * x + d2);
    regularized_incomplete_beta(d1 / 2.0, d2 / 2.0, z)
}

/// Upper tail P(F ≥ x), the p-value of an F test
///
/// Uses the complementary incomplete beta directly. With `d1 = 1` this is
/// the same call as the two-tailed t p-value of `√x`.
pub fn f_upper_tail(x: f64, d1: f64, d2: f64) -> f64 {
    if x.is_nan() || d2 <= 0.0 {
        return 1.0;
    }
    if x <= 0.0 {
        return 1.0;
    }
    regularized_incomplete_beta(d2 / 2.0, d1 / 2.0, d2 / (d2 + d1 * x)).clamp(0.0, 1.0)
}
