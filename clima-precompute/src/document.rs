//! Input scatter data and the precomputed statistics document

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clima_core::StatsError;
use clima_stats::batch::{self, Driver, NamedSeries, PairOutcome};
use clima_stats::StatisticsEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============ Input ============

/// Monthly scores per dimension, as exported by the dashboard backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScatterData {
    pub months: Vec<String>,
    pub dimension_scores: Vec<DimensionScores>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DimensionScores {
    pub dimension: String,
    pub scores: Vec<f64>,
}

impl ScatterData {
    fn series(&self) -> Vec<NamedSeries> {
        self.dimension_scores
            .iter()
            .map(|d| NamedSeries::new(d.dimension.clone(), d.scores.clone()))
            .collect()
    }
}

// ============ Output ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedDocument {
    pub generated_at: DateTime<Utc>,
    pub months: Vec<String>,
    pub dimensions: Vec<String>,
    /// Pearson r in `dimensions` order; `null` where the pair failed
    pub correlation_matrix: Vec<Vec<Option<f64>>>,
    pub pairs: Vec<PairOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivers: Option<DriverRanking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRanking {
    pub target: String,
    pub ranking: Vec<Driver>,
}

/// Run every pair through the engine and assemble the document
pub fn build_document(
    input: &ScatterData,
    engine: &StatisticsEngine,
    target: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<PrecomputedDocument> {
    let mut seen = HashSet::new();
    for d in &input.dimension_scores {
        if !seen.insert(d.dimension.as_str()) {
            bail!("dimension '{}' appears more than once", d.dimension);
        }
        if d.scores.len() != input.months.len() {
            tracing::warn!(
                dimension = %d.dimension,
                scores = d.scores.len(),
                months = input.months.len(),
                "score count differs from month count"
            );
        }
    }
    if let Some(target) = target {
        if !seen.contains(target) {
            bail!("driver target '{}' is not one of the input dimensions", target);
        }
    }

    let series = input.series();
    let pairs = batch::pairwise(&series, engine);
    let correlation_matrix = batch::correlation_matrix(&series, &pairs);
    let drivers = target.map(|target| DriverRanking {
        target: target.to_string(),
        ranking: batch::rank_drivers(target, &pairs),
    });

    Ok(PrecomputedDocument {
        generated_at,
        months: input.months.clone(),
        dimensions: series.into_iter().map(|s| s.code).collect(),
        correlation_matrix,
        pairs,
        drivers,
    })
}

/// A computed pair whose record failed the invariant check
#[derive(Debug)]
pub struct RecordProblem {
    pub dim1: String,
    pub dim2: String,
    pub error: StatsError,
}

/// Check every computed record of a loaded document
pub fn verify_document(document: &PrecomputedDocument) -> Vec<RecordProblem> {
    document
        .pairs
        .iter()
        .filter_map(|outcome| match outcome {
            PairOutcome::Computed(record) => record.statistics.validate().err().map(|error| RecordProblem {
                dim1: record.dim1.clone(),
                dim2: record.dim2.clone(),
                error,
            }),
            PairOutcome::Failed(_) => None,
        })
        .collect()
}
