//! Standard normal helpers

/// Two-sided 95% critical value of the standard normal, used for Fisher z
/// intervals
pub const Z_95: f64 = 1.96;

/// Standard normal quantile, rational approximation (Abramowitz and Stegun
/// 26.2.23, |error| < 4.5e-4)
///
/// Accurate enough as a starting point for iterative inverses; not used
/// as a critical value on its own.
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 3] = [2.515517, 0.802853, 0.010328];
    const B: [f64; 3] = [1.432788, 0.189269, 0.001308];

    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }

    let sign = if p < 0.5 { -1.0 } else { 1.0 };
    let p_adj = if p < 0.5 { p } else { 1.0 - p };
    let t = (-2.0 * p_adj.ln()).sqrt();
    let num = A[0] + t * (A[1] + t * A[2]);
    let den = 1.0 + t * (B[0] + t * (B[1] + t * B[2]));
    sign * (t - num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_quantile() {
        assert!((normal_quantile(0.975) - 1.96).abs() < 1e-3);
        assert!((normal_quantile(0.025) + 1.96).abs() < 1e-3);
        assert!(normal_quantile(0.5).abs() < 1e-3);
    }
}
