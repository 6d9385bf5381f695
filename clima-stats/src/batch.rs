//! Batch computation over every pair of named series
//!
//! Pairs are independent, so they are fanned out with rayon and collected
//! back in `(i, j)` order. A pair that fails validation is reported in place
//! and does not abort the batch.

use crate::facade::StatisticsEngine;
use clima_core::{
    CombinedStatistics, Direction, ErrorReport, PredictionBandPoint, Strength,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One dimension's monthly scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub code: String,
    pub values: Vec<f64>,
}

impl NamedSeries {
    pub fn new(code: impl Into<String>, values: Vec<f64>) -> Self {
        Self { code: code.into(), values }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    pub dim1: String,
    pub dim2: String,
    pub statistics: CombinedStatistics,
    pub strength: Strength,
    pub direction: Direction,
    pub bands: Vec<PredictionBandPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFailure {
    pub dim1: String,
    pub dim2: String,
    pub error: ErrorReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairOutcome {
    Computed(PairRecord),
    Failed(PairFailure),
}

impl PairOutcome {
    pub fn dims(&self) -> (&str, &str) {
        match self {
            PairOutcome::Computed(record) => (&record.dim1, &record.dim2),
            PairOutcome::Failed(failure) => (&failure.dim1, &failure.dim2),
        }
    }

    pub fn pearson_r(&self) -> Option<f64> {
        match self {
            PairOutcome::Computed(record) => Some(record.statistics.correlation.pearson_r),
            PairOutcome::Failed(_) => None,
        }
    }
}

/// Engagement-driver entry: a dimension ranked by |r| against the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub dimension: String,
    #[serde(with = "clima_core::finite")]
    pub correlation: f64,
    pub impact_rank: usize,
}

/// Statistics for every unordered pair `(i, j)`, `i < j`
pub fn pairwise(series: &[NamedSeries], engine: &StatisticsEngine) -> Vec<PairOutcome> {
    let pairs: Vec<(usize, usize)> = (0..series.len())
        .flat_map(|i| ((i + 1)..series.len()).map(move |j| (i, j)))
        .collect();

    tracing::info!(dimensions = series.len(), pairs = pairs.len(), "computing pairwise statistics");

    let outcomes: Vec<PairOutcome> = pairs
        .par_iter()
        .map(|&(i, j)| compute_pair(&series[i], &series[j], engine))
        .collect();

    let failed = outcomes.iter().filter(|o| matches!(o, PairOutcome::Failed(_))).count();
    if failed > 0 {
        tracing::info!(failed, "some pairs failed validation");
    }
    outcomes
}

fn compute_pair(a: &NamedSeries, b: &NamedSeries, engine: &StatisticsEngine) -> PairOutcome {
    match engine.compute(&a.values, &b.values) {
        Ok(statistics) => {
            let r = statistics.correlation.pearson_r;
            let bands = engine.bands(&a.values, &statistics.regression);
            PairOutcome::Computed(PairRecord {
                dim1: a.code.clone(),
                dim2: b.code.clone(),
                strength: Strength::from_r(r),
                direction: Direction::from_r(r),
                statistics,
                bands,
            })
        }
        Err(err) => {
            tracing::debug!(dim1 = %a.code, dim2 = %b.code, code = err.code(), "pair skipped");
            PairOutcome::Failed(PairFailure {
                dim1: a.code.clone(),
                dim2: b.code.clone(),
                error: ErrorReport::from(err),
            })
        }
    }
}

/// Symmetric matrix of Pearson r in `series` order; diagonal 1, `None` for failed pairs
pub fn correlation_matrix(series: &[NamedSeries], outcomes: &[PairOutcome]) -> Vec<Vec<Option<f64>>> {
    let k = series.len();
    let index_of = |code: &str| series.iter().position(|s| s.code == code);

    let mut matrix = vec![vec![None; k]; k];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = Some(1.0);
    }
    for outcome in outcomes {
        let (dim1, dim2) = outcome.dims();
        if let (Some(i), Some(j)) = (index_of(dim1), index_of(dim2)) {
            matrix[i][j] = outcome.pearson_r();
            matrix[j][i] = outcome.pearson_r();
        }
    }
    matrix
}

/// Every dimension paired with `target`, by descending |r|, ranked from 1
///
/// Equal |r| falls back to the dimension code so the ranking is stable.
pub fn rank_drivers(target: &str, outcomes: &[PairOutcome]) -> Vec<Driver> {
    let mut candidates: Vec<(String, f64)> = outcomes
        .iter()
        .filter_map(|outcome| {
            let r = outcome.pearson_r()?;
            match outcome.dims() {
                (dim1, dim2) if dim1 == target => Some((dim2.to_string(), r)),
                (dim1, dim2) if dim2 == target => Some((dim1.to_string(), r)),
                _ => None,
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then_with(|| a.0.cmp(&b.0)));

    candidates
        .into_iter()
        .enumerate()
        .map(|(rank, (dimension, correlation))| Driver {
            dimension,
            correlation,
            impact_rank: rank + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clima_core::codes;

    fn series() -> Vec<NamedSeries> {
        vec![
            NamedSeries::new("ENG", vec![3.1, 3.4, 3.3, 3.8, 4.0, 4.2, 4.1, 4.5]),
            NamedSeries::new("LID", vec![2.9, 3.2, 3.3, 3.6, 3.9, 4.1, 4.0, 4.4]),
            NamedSeries::new("COM", vec![4.0, 3.9, 4.1, 3.7, 3.8, 3.5, 3.6, 3.4]),
            NamedSeries::new("FLAT", vec![3.0; 8]),
        ]
    }

    #[test]
    fn test_pairwise_order_and_count() {
        let outcomes = pairwise(&series(), &StatisticsEngine::default());
        let dims: Vec<(&str, &str)> = outcomes.iter().map(|o| o.dims()).collect();
        assert_eq!(
            dims,
            vec![
                ("ENG", "LID"),
                ("ENG", "COM"),
                ("ENG", "FLAT"),
                ("LID", "COM"),
                ("LID", "FLAT"),
                ("COM", "FLAT"),
            ]
        );
    }

    #[test]
    fn test_failed_pairs_reported_in_place() {
        let outcomes = pairwise(&series(), &StatisticsEngine::default());
        match &outcomes[2] {
            PairOutcome::Failed(failure) => assert_eq!(failure.error.code, codes::DEGENERATE_INPUT),
            other => panic!("expected failure, got {:?}", other),
        }
        match &outcomes[0] {
            PairOutcome::Computed(record) => {
                assert_eq!(record.direction, Direction::Positive);
                assert_eq!(record.bands.len(), 30);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_matches_sequential() {
        let engine = StatisticsEngine::default();
        let data = series();
        let outcomes = pairwise(&data, &engine);
        let direct = engine.compute(&data[1].values, &data[2].values).unwrap();
        match &outcomes[3] {
            PairOutcome::Computed(record) => assert_eq!(record.statistics, direct),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_correlation_matrix() {
        let data = series();
        let outcomes = pairwise(&data, &StatisticsEngine::default());
        let matrix = correlation_matrix(&data, &outcomes);
        assert_eq!(matrix.len(), 4);
        for i in 0..4 {
            assert_eq!(matrix[i][i], Some(1.0));
            for j in 0..4 {
                assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
        assert_eq!(matrix[0][3], None);
        assert!(matrix[0][2].unwrap() < 0.0);
    }

    #[test]
    fn test_rank_drivers() {
        let outcomes = pairwise(&series(), &StatisticsEngine::default());
        let drivers = rank_drivers("ENG", &outcomes);
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].dimension, "LID");
        assert_eq!(drivers[0].impact_rank, 1);
        assert_eq!(drivers[1].dimension, "COM");
        assert_eq!(drivers[1].impact_rank, 2);
        assert!(drivers[0].correlation.abs() >= drivers[1].correlation.abs());
    }

    #[test]
    fn test_outcome_serialization_tag() {
        let outcomes = pairwise(&series(), &StatisticsEngine::default());
        let json = serde_json::to_value(&outcomes).unwrap();
        assert_eq!(json[0]["status"], "computed");
        assert_eq!(json[2]["status"], "failed");
        assert_eq!(json[2]["error"]["code"], "DEGENERATE_INPUT");
        assert!(json[0]["statistics"]["correlation"]["pearsonR"].is_number());
    }
}
