//! Structured errors for statistics callers
//!
//! Engine errors are caller data problems found before any statistic is
//! computed. They are never retried and never replaced by default values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const SHAPE_MISMATCH: &str = "SHAPE_MISMATCH";
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const DEGENERATE_INPUT: &str = "DEGENERATE_INPUT";
    pub const NON_FINITE_VALUE: &str = "NON_FINITE_VALUE";
    pub const INVALID_RECORD: &str = "INVALID_RECORD";
}

/// Side of a sample pair an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Error kind without payload, for callers that only branch on the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShapeMismatch,
    InsufficientData,
    DegenerateInput,
    NonFiniteValue,
    InvalidRecord,
}

/// Error returned by the statistics engine and by record validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("x has {x_len} values but y has {y_len}")]
    ShapeMismatch { x_len: usize, y_len: usize },

    #[error("need at least {required} paired values, got {n}")]
    InsufficientData { n: usize, required: usize },

    #[error("{axis} has zero variance")]
    DegenerateInput { axis: Axis },

    #[error("{axis}[{index}] is not a finite number")]
    NonFiniteValue { axis: Axis, index: usize },

    /// Raised only when a deserialized record breaks an invariant.
    #[error("invalid record field '{field}': {reason}")]
    InvalidRecord { field: String, reason: String },
}

impl StatsError {
    pub fn invalid_record(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StatsError::InvalidRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StatsError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            StatsError::InsufficientData { .. } => ErrorKind::InsufficientData,
            StatsError::DegenerateInput { .. } => ErrorKind::DegenerateInput,
            StatsError::NonFiniteValue { .. } => ErrorKind::NonFiniteValue,
            StatsError::InvalidRecord { .. } => ErrorKind::InvalidRecord,
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ShapeMismatch => codes::SHAPE_MISMATCH,
            ErrorKind::InsufficientData => codes::INSUFFICIENT_DATA,
            ErrorKind::DegenerateInput => codes::DEGENERATE_INPUT,
            ErrorKind::NonFiniteValue => codes::NON_FINITE_VALUE,
            ErrorKind::InvalidRecord => codes::INVALID_RECORD,
        }
    }

    /// Suggestion for fixing the input
    pub fn suggestion(&self) -> String {
        match self {
            StatsError::ShapeMismatch { .. } => {
                "Pair x and y by index; both series must cover the same months".to_string()
            }
            StatsError::InsufficientData { required, .. } => {
                format!("Provide at least {} paired observations", required)
            }
            StatsError::DegenerateInput { axis } => {
                format!("{} is constant; correlation and slope are undefined", axis)
            }
            StatsError::NonFiniteValue { axis, index } => {
                format!("Remove or impute {}[{}] before computing statistics", axis, index)
            }
            StatsError::InvalidRecord { .. } => {
                "Recompute the record with the current engine".to_string()
            }
        }
    }
}

/// Serializable error, embedded in batch documents in place of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&StatsError> for ErrorReport {
    fn from(err: &StatsError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: Some(err.suggestion()),
        }
    }
}

impl From<StatsError> for ErrorReport {
    fn from(err: StatsError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}
