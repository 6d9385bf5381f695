//! Statistics records
//!
//! Every record is created fresh per call and is plain data: the engine
//! fills them in, callers serialize them, and documents loaded back from
//! JSON go through [`CombinedStatistics::validate`] before use.

use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Small shared types ============

/// Closed interval `[lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(with = "crate::finite")]
    pub lower: f64,
    #[serde(with = "crate::finite")]
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Confidence interval for a correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationInterval {
    #[serde(with = "crate::finite")]
    pub lower: f64,
    #[serde(with = "crate::finite")]
    pub upper: f64,
    /// Confidence level, e.g. 0.95
    #[serde(with = "crate::finite")]
    pub level: f64,
}

impl CorrelationInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Prediction interval for a single new observation at `at_x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInterval {
    #[serde(with = "crate::finite")]
    pub lower: f64,
    #[serde(with = "crate::finite")]
    pub upper: f64,
    #[serde(with = "crate::finite")]
    pub at_x: f64,
}

// ============ Classifications ============

/// Qualitative magnitude of |r|
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl EffectSize {
    /// `<0.1` negligible, `<0.3` small, `<0.5` medium, `<0.7` large, else very large
    pub fn from_r(r: f64) -> Self {
        let abs_r = r.abs();
        if abs_r < 0.1 {
            EffectSize::Negligible
        } else if abs_r < 0.3 {
            EffectSize::Small
        } else if abs_r < 0.5 {
            EffectSize::Medium
        } else if abs_r < 0.7 {
            EffectSize::Large
        } else {
            EffectSize::VeryLarge
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectSize::Negligible => "negligible",
            EffectSize::Small => "small",
            EffectSize::Medium => "medium",
            EffectSize::Large => "large",
            EffectSize::VeryLarge => "very_large",
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conventional significance bucket of a p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignificanceLevel {
    #[serde(rename = "p<0.001")]
    Below001,
    #[serde(rename = "p<0.01")]
    Below01,
    #[serde(rename = "p<0.05")]
    Below05,
    #[serde(rename = "p≥0.05")]
    NotSignificant,
}

impl SignificanceLevel {
    pub fn from_p(p: f64) -> Self {
        if p < 0.001 {
            SignificanceLevel::Below001
        } else if p < 0.01 {
            SignificanceLevel::Below01
        } else if p < 0.05 {
            SignificanceLevel::Below05
        } else {
            SignificanceLevel::NotSignificant
        }
    }
}

/// Strength label used in insight text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    pub fn from_r(r: f64) -> Self {
        let abs_r = r.abs();
        if abs_r >= 0.7 {
            Strength::VeryStrong
        } else if abs_r >= 0.5 {
            Strength::Strong
        } else if abs_r >= 0.3 {
            Strength::Moderate
        } else if abs_r >= 0.1 {
            Strength::Weak
        } else {
            Strength::VeryWeak
        }
    }
}

/// Sign of a relationship, with a ±0.1 dead zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
    None,
}

impl Direction {
    pub fn from_r(r: f64) -> Self {
        if r > 0.1 {
            Direction::Positive
        } else if r < -0.1 {
            Direction::Negative
        } else {
            Direction::None
        }
    }
}

/// Coarse transform suggestion from the nonlinearity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformLabel {
    None,
    Log,
    Quadratic,
}

impl TransformLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformLabel::None => "none",
            TransformLabel::Log => "log",
            TransformLabel::Quadratic => "quadratic",
        }
    }
}

// ============ CorrelationStatistics ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationStatistics {
    pub n: usize,
    pub degrees_of_freedom: usize,
    #[serde(with = "crate::finite")]
    pub pearson_r: f64,
    #[serde(with = "crate::finite")]
    pub spearman_rho: f64,
    #[serde(with = "crate::finite")]
    pub t_statistic: f64,
    #[serde(with = "crate::finite")]
    pub p_value: f64,
    pub is_significant: bool,
    pub significance_level: SignificanceLevel,
    pub confidence_interval: CorrelationInterval,
    pub effect_size: EffectSize,
    #[serde(with = "crate::finite")]
    pub cohen_d: f64,
}

// ============ RegressionStatistics ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionStatistics {
    #[serde(with = "crate::finite")]
    pub slope: f64,
    #[serde(with = "crate::finite")]
    pub intercept: f64,
    #[serde(with = "crate::finite")]
    pub standard_error_slope: f64,
    #[serde(with = "crate::finite")]
    pub standard_error_intercept: f64,
    #[serde(with = "crate::finite")]
    pub t_statistic_slope: f64,
    #[serde(with = "crate::finite")]
    pub t_statistic_intercept: f64,
    #[serde(with = "crate::finite")]
    pub p_value_slope: f64,
    pub slope_significant: bool,
    #[serde(rename = "slopeCI")]
    pub slope_ci: Interval,
    #[serde(rename = "interceptCI")]
    pub intercept_ci: Interval,
    #[serde(with = "crate::finite")]
    pub r_squared: f64,
    #[serde(with = "crate::finite")]
    pub adjusted_r_squared: f64,
    /// Residual standard error
    #[serde(with = "crate::finite")]
    pub standard_error_estimate: f64,
    #[serde(with = "crate::finite")]
    pub f_statistic: f64,
    #[serde(with = "crate::finite")]
    pub p_value_model: f64,
    pub prediction_interval: PointInterval,
    pub equation: String,
}

// ============ Prediction bands ============

/// One grid point of a confidence/prediction band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionBandPoint {
    #[serde(with = "crate::finite")]
    pub x: f64,
    #[serde(with = "crate::finite")]
    pub predicted: f64,
    #[serde(rename = "lowerCI", with = "crate::finite")]
    pub lower_ci: f64,
    #[serde(rename = "upperCI", with = "crate::finite")]
    pub upper_ci: f64,
    #[serde(rename = "lowerPI", with = "crate::finite")]
    pub lower_pi: f64,
    #[serde(rename = "upperPI", with = "crate::finite")]
    pub upper_pi: f64,
}

// ============ Nonlinearity ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonlinearityReport {
    pub is_nonlinear: bool,
    /// Fitted quadratic coefficient
    #[serde(with = "crate::finite")]
    pub curvature: f64,
    pub optimal_transform: TransformLabel,
    /// Quadratic coefficient over its standard error
    #[serde(with = "crate::finite")]
    pub t_ratio: f64,
    #[serde(with = "crate::finite")]
    pub linear_r2: f64,
    /// `None` when no quadratic fit was possible
    #[serde(with = "crate::finite::option", default)]
    pub quadratic_r2: Option<f64>,
}

impl NonlinearityReport {
    /// Report for samples too small or too degenerate to fit a quadratic
    pub fn linear_only(linear_r2: f64) -> Self {
        Self {
            is_nonlinear: false,
            curvature: 0.0,
            optimal_transform: TransformLabel::None,
            t_ratio: 0.0,
            linear_r2,
            quadratic_r2: None,
        }
    }
}

// ============ CombinedStatistics ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedStatistics {
    pub correlation: CorrelationStatistics,
    pub regression: RegressionStatistics,
    pub nonlinearity: NonlinearityReport,
    pub warnings: Vec<String>,
}

impl CombinedStatistics {
    /// Check a record that came from outside the engine (e.g. a precomputed
    /// document) against the invariants the engine guarantees.
    pub fn validate(&self) -> Result<(), StatsError> {
        let c = &self.correlation;
        let r = &self.regression;

        let finite_fields = [
            ("correlation.pearsonR", c.pearson_r),
            ("correlation.spearmanRho", c.spearman_rho),
            ("correlation.tStatistic", c.t_statistic),
            ("correlation.pValue", c.p_value),
            ("correlation.confidenceInterval.lower", c.confidence_interval.lower),
            ("correlation.confidenceInterval.upper", c.confidence_interval.upper),
            ("correlation.cohenD", c.cohen_d),
            ("regression.slope", r.slope),
            ("regression.intercept", r.intercept),
            ("regression.standardErrorSlope", r.standard_error_slope),
            ("regression.standardErrorIntercept", r.standard_error_intercept),
            ("regression.tStatisticSlope", r.t_statistic_slope),
            ("regression.tStatisticIntercept", r.t_statistic_intercept),
            ("regression.pValueSlope", r.p_value_slope),
            ("regression.slopeCI.lower", r.slope_ci.lower),
            ("regression.slopeCI.upper", r.slope_ci.upper),
            ("regression.interceptCI.lower", r.intercept_ci.lower),
            ("regression.interceptCI.upper", r.intercept_ci.upper),
            ("regression.rSquared", r.r_squared),
            ("regression.adjustedRSquared", r.adjusted_r_squared),
            ("regression.standardErrorEstimate", r.standard_error_estimate),
            ("regression.fStatistic", r.f_statistic),
            ("regression.pValueModel", r.p_value_model),
            ("nonlinearity.curvature", self.nonlinearity.curvature),
            ("nonlinearity.tRatio", self.nonlinearity.t_ratio),
            ("nonlinearity.linearR2", self.nonlinearity.linear_r2),
        ];
        for (field, value) in finite_fields {
            if !value.is_finite() {
                return Err(StatsError::invalid_record(field, "must be a finite number"));
            }
        }

        check_range("correlation.pearsonR", c.pearson_r, -1.0, 1.0)?;
        check_range("correlation.spearmanRho", c.spearman_rho, -1.0, 1.0)?;
        check_range("correlation.pValue", c.p_value, 0.0, 1.0)?;
        check_range("regression.pValueSlope", r.p_value_slope, 0.0, 1.0)?;
        check_range("regression.pValueModel", r.p_value_model, 0.0, 1.0)?;

        if c.n < 3 || c.degrees_of_freedom != c.n - 2 {
            return Err(StatsError::invalid_record(
                "correlation.degreesOfFreedom",
                format!("expected n - 2 with n >= 3, got n = {}, df = {}", c.n, c.degrees_of_freedom),
            ));
        }
        if c.is_significant != (c.p_value < 0.05) {
            return Err(StatsError::invalid_record("correlation.isSignificant", "disagrees with pValue"));
        }
        if !c.confidence_interval.contains(c.pearson_r) {
            return Err(StatsError::invalid_record(
                "correlation.confidenceInterval",
                "does not contain pearsonR",
            ));
        }
        if !r.slope_ci.contains(r.slope) {
            return Err(StatsError::invalid_record("regression.slopeCI", "does not contain slope"));
        }
        if !r.intercept_ci.contains(r.intercept) {
            return Err(StatsError::invalid_record("regression.interceptCI", "does not contain intercept"));
        }
        if r.adjusted_r_squared > r.r_squared {
            return Err(StatsError::invalid_record("regression.adjustedRSquared", "exceeds rSquared"));
        }
        if (r.r_squared - c.pearson_r * c.pearson_r).abs() > 1e-6 {
            return Err(StatsError::invalid_record("regression.rSquared", "differs from pearsonR squared"));
        }

        Ok(())
    }
}

fn check_range(field: &str, value: f64, lo: f64, hi: f64) -> Result<(), StatsError> {
    if value < lo || value > hi {
        return Err(StatsError::invalid_record(
            field,
            format!("{} outside [{}, {}]", value, lo, hi),
        ));
    }
    Ok(())
}
