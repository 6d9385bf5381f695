//! Clima Core - Statistics records and errors
//!
//! This crate provides the plain-data types shared by the engine and its
//! callers:
//! - `CombinedStatistics` and its parts: the result of one dimension pair
//! - `StatsError`: structured errors with machine-readable codes
//! - `finite`: serde helpers that keep NaN/Infinity out of JSON

mod error;
mod record;
pub mod finite;

pub use error::{codes, Axis, ErrorKind, ErrorReport, StatsError};
pub use record::{
    CombinedStatistics, CorrelationInterval, CorrelationStatistics, Direction, EffectSize,
    Interval, NonlinearityReport, PointInterval, PredictionBandPoint, RegressionStatistics,
    SignificanceLevel, Strength, TransformLabel,
};
