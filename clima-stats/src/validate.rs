//! Sample validation
//!
//! Checks shape and degeneracy of a paired sample before any statistic is
//! computed. The first violated precondition is reported, in this order:
//! shape, size, finiteness, variance.

use crate::helpers::sum_squared_deviations;
use clima_core::{Axis, StatsError};

/// Smallest sample with at least one residual degree of freedom
pub const MIN_SAMPLES: usize = 3;

/// Check a paired sample without keeping it
pub fn validate(x: &[f64], y: &[f64]) -> Result<(), StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::ShapeMismatch { x_len: x.len(), y_len: y.len() });
    }

    let n = x.len();
    if n < MIN_SAMPLES {
        return Err(StatsError::InsufficientData { n, required: MIN_SAMPLES });
    }

    for (axis, values) in [(Axis::X, x), (Axis::Y, y)] {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::NonFiniteValue { axis, index });
        }
    }

    for (axis, values) in [(Axis::X, x), (Axis::Y, y)] {
        if !has_usable_spread(values) {
            return Err(StatsError::DegenerateInput { axis });
        }
    }

    Ok(())
}

/// Σ(v - v̄)² is a normal float: not zero, subnormal or overflowed
fn has_usable_spread(values: &[f64]) -> bool {
    sum_squared_deviations(values).is_normal()
}

/// A paired sample that passed [`validate`]
///
/// Holding one is proof that both sequences have the same length n ≥ 3,
/// only finite values, and a representable non-zero spread.
#[derive(Debug, Clone, Copy)]
pub struct SamplePair<'a> {
    x: &'a [f64],
    y: &'a [f64],
}

impl<'a> SamplePair<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64]) -> Result<Self, StatsError> {
        validate(x, y)?;
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &'a [f64] {
        self.x
    }

    pub fn y(&self) -> &'a [f64] {
        self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
