//! Correlation statistics: Pearson, Spearman, significance, Fisher CI, effect size

use crate::distributions::{t_two_tailed_p, Z_95};
use crate::helpers::{ranks, Moments};
use crate::validate::SamplePair;
use clima_core::{
    CorrelationInterval, CorrelationStatistics, EffectSize, SignificanceLevel,
};

/// Significance threshold for `is_significant`
pub const ALPHA: f64 = 0.05;

/// Confidence level of every interval the engine reports
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Pearson r of raw sequences, clamped to [-1, 1]
pub fn pearson_r(x: &[f64], y: &[f64]) -> f64 {
    Moments::of(x, y).pearson_r()
}

/// Spearman ρ: Pearson r of the average ranks
pub fn spearman_rho(x: &[f64], y: &[f64]) -> f64 {
    pearson_r(&ranks(x), &ranks(y))
}

/// Full correlation statistics for a validated pair
pub fn correlate(sample: &SamplePair) -> CorrelationStatistics {
    let n = sample.len();
    let df = n - 2;

    let r = pearson_r(sample.x(), sample.y());
    let rho = spearman_rho(sample.x(), sample.y());

    let t_statistic = correlation_t(r, df as f64);
    let p_value = t_two_tailed_p(t_statistic, df as f64);

    CorrelationStatistics {
        n,
        degrees_of_freedom: df,
        pearson_r: r,
        spearman_rho: rho,
        t_statistic,
        p_value,
        is_significant: p_value < ALPHA,
        significance_level: SignificanceLevel::from_p(p_value),
        confidence_interval: fisher_interval(r, n),
        effect_size: EffectSize::from_r(r),
        cohen_d: cohen_d(r),
    }
}

/// t = r·√((n-2)/(1-r²)), saturated to ±f64::MAX when |r| = 1
pub fn correlation_t(r: f64, df: f64) -> f64 {
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return f64::MAX.copysign(r);
    }
    clima_core::finite::saturate(r * (df / one_minus_r2).sqrt())
}

/// 95% interval for r via Fisher's z = atanh(r), z ± 1.96/√(n-3)
///
/// |r| = 1 collapses to [r, r]. With n = 3 the z-space standard error is
/// undefined and the interval is the full range [-1, 1].
pub fn fisher_interval(r: f64, n: usize) -> CorrelationInterval {
    let interval = |lower: f64, upper: f64| CorrelationInterval {
        lower,
        upper,
        level: CONFIDENCE_LEVEL,
    };

    if r.abs() >= 1.0 {
        return interval(r, r);
    }
    if n <= 3 {
        return interval(-1.0, 1.0);
    }

    let z = r.atanh();
    if !z.is_finite() {
        return interval(r, r);
    }
    let half_width = Z_95 / ((n - 3) as f64).sqrt();

    // tanh is monotone, the min/max only absorbs rounding at |r| ≈ 1
    let lower = (z - half_width).tanh().min(r);
    let upper = (z + half_width).tanh().max(r);
    interval(lower, upper)
}

/// Cohen's d from r: d = 2r / √(1 - r²), saturated as |r| → 1
pub fn cohen_d(r: f64) -> f64 {
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return f64::MAX.copysign(r);
    }
    clima_core::finite::saturate(2.0 * r / one_minus_r2.sqrt())
}
