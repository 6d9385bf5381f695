//! Helper functions for statistical operations
//!
//! Shared sums, ranks and the small ratio guards used across modules.

/// Sums of a paired sample around its means
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub n: usize,
    pub mean_x: f64,
    pub mean_y: f64,
    /// Σ(x - x̄)²
    pub sxx: f64,
    /// Σ(y - ȳ)²
    pub syy: f64,
    /// Σ(x - x̄)(y - ȳ)
    pub sxy: f64,
}

impl Moments {
    pub fn of(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        let mean_x = mean(x);
        let mean_y = mean(y);

        let mut sxx = 0.0;
        let mut syy = 0.0;
        let mut sxy = 0.0;
        for (xi, yi) in x.iter().zip(y.iter()) {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        Self { n, mean_x, mean_y, sxx, syy, sxy }
    }

    /// Pearson r = Sxy / (√Sxx·√Syy), clamped to [-1, 1]
    pub fn pearson_r(&self) -> f64 {
        // Sxx·Syy itself can overflow
        let denominator = self.sxx.sqrt() * self.syy.sqrt();
        if denominator == 0.0 {
            return 0.0;
        }
        (self.sxy / denominator).clamp(-1.0, 1.0)
    }
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Σ(v - v̄)²
pub fn sum_squared_deviations(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

/// 1-based ranks, ties share the average of the ranks they span
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut result = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j < order.len() && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j hold ranks i+1..=j
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            result[idx] = avg_rank;
        }
        i = j;
    }
    result
}

/// `estimate / standard_error`, saturated when the error is zero
///
/// A zero estimate over a zero error is 0; a non-zero estimate over a zero
/// error is `±f64::MAX`.
pub fn guarded_ratio(estimate: f64, standard_error: f64) -> f64 {
    if standard_error == 0.0 {
        if estimate == 0.0 {
            return 0.0;
        }
        return f64::MAX.copysign(estimate);
    }
    clima_core::finite::saturate(estimate / standard_error)
}

/// Evenly spaced grid of `size` points from `lo` to `hi` inclusive.
///
/// A single point sits at the midpoint; the last point is exactly `hi`.
pub fn linspace(lo: f64, hi: f64, size: usize) -> Vec<f64> {
    match size {
        0 => Vec::new(),
        1 => vec![lo + (hi - lo) / 2.0],
        _ => {
            let step = (hi - lo) / (size - 1) as f64;
            (0..size)
                .map(|i| if i == size - 1 { hi } else { lo + i as f64 * step })
                .collect()
        }
    }
}

/// Minimum and maximum of a non-empty slice of finite values
pub fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let m = Moments::of(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(m.mean_x, 3.0);
        assert_eq!(m.mean_y, 6.0);
        assert_eq!(m.sxx, 10.0);
        assert_eq!(m.syy, 40.0);
        assert_eq!(m.sxy, 20.0);
        assert_eq!(m.pearson_r(), 1.0);
    }

    #[test]
    fn test_pearson_r_with_large_spread() {
        let m = Moments::of(&[1e100, 2e100, 3e100, 4e100], &[1e100, 2e100, 3e100, 4.5e100]);
        assert!((m.sxx * m.syy).is_infinite());
        let r = m.pearson_r();
        assert!((r - 0.994_376_9).abs() < 1e-6, "r = {}", r);

        let same = Moments::of(&[1e100, 2e100, 3e100, 4e100], &[1e100, 2e100, 3e100, 4e100]);
        assert!((same.pearson_r() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ranks_without_ties() {
        assert_eq!(ranks(&[30.0, 10.0, 20.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_ranks_average_ties() {
        assert_eq!(ranks(&[1.0, 2.0, 2.0, 3.0]), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(ranks(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_guarded_ratio() {
        assert_eq!(guarded_ratio(0.0, 0.0), 0.0);
        assert_eq!(guarded_ratio(2.0, 0.0), f64::MAX);
        assert_eq!(guarded_ratio(-2.0, 0.0), -f64::MAX);
        assert_eq!(guarded_ratio(3.0, 1.5), 2.0);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0, 4.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        let grid = linspace(0.1, 0.7, 7);
        assert_eq!(grid[6], 0.7);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max(&[3.0, -1.0, 7.5]), (-1.0, 7.5));
    }
}
