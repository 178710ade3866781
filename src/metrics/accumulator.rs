//! Per-entity score matrices and their summaries.

use crate::metrics::scorer::MetricRow;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metric keys produced for bookkeeping only and never kept in a matrix.
pub const RESERVED_TIMING_KEYS: [&str; 2] = ["fit_time", "score_time"];

/// One (iteration, fold) row of a score matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    /// Iteration, from 0
    pub iteration: usize,
    /// Fold within the iteration, from 0
    pub fold: usize,
    /// Aligned with the owning matrix's columns
    pub values: Vec<f64>,
}

/// Append-only scores of one entity: rows = folds, columns = scorers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    /// Entity name (classifier or aggregator)
    pub entity: String,
    /// Scorer names
    pub columns: Vec<String>,
    /// Rows in append order
    pub rows: Vec<ScoreRow>,
}

impl ScoreMatrix {
    /// Create an empty matrix.
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            ..Default::default()
        }
    }

    /// Append a fold's metrics, dropping reserved timing keys.
    ///
    /// Keys unseen so far add a column back-filled with NaN, keys missing
    /// from `metrics` are stored as NaN.
    pub fn append(&mut self, iteration: usize, fold: usize, metrics: &MetricRow) {
        for key in metrics.keys() {
            if RESERVED_TIMING_KEYS.contains(&key.as_str()) || self.columns.contains(key) {
                continue;
            }
            self.columns.push(key.clone());
            for row in &mut self.rows {
                row.values.push(f64::NAN);
            }
        }

        let values = self
            .columns
            .iter()
            .map(|column| metrics.get(column).copied().unwrap_or(f64::NAN))
            .collect();
        self.rows.push(ScoreRow {
            iteration,
            fold,
            values,
        });
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was appended.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column values in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().map(|row| row.values[idx]).collect())
    }

    /// Mean of one column, skipping NaN.
    pub fn mean(&self, name: &str) -> f64 {
        self.column(name).map_or(f64::NAN, |values| nan_mean(&values))
    }
}

fn nan_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        f64::NAN
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}

/// Column-wise means of several matrices on a shared column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub columns: Vec<String>,
    /// entity → means aligned with `columns`
    pub means: IndexMap<String, Vec<f64>>,
}

impl Summary {
    /// Mean of one entity on one scorer.
    pub fn get(&self, entity: &str, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.means.get(entity).map(|means| means[idx])
    }
}

/// Summarise matrices; columns are the union in first-seen order.
pub fn summary(matrices: &[&ScoreMatrix]) -> Summary {
    let mut columns: Vec<String> = Vec::new();
    for matrix in matrices {
        for column in &matrix.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let means = matrices
        .iter()
        .map(|matrix| {
            let row = columns.iter().map(|column| matrix.mean(column)).collect();
            (matrix.entity.clone(), row)
        })
        .collect();

    Summary { columns, means }
}

/// Collects every entity's matrix across iterations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScoreAccumulator {
    matrices: IndexMap<String, ScoreMatrix>,
}

impl ScoreAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fold's metrics for an entity.
    pub fn append(&mut self, entity: &str, iteration: usize, fold: usize, metrics: &MetricRow) {
        self.matrices
            .entry(entity.to_string())
            .or_insert_with(|| ScoreMatrix::new(entity))
            .append(iteration, fold, metrics);
    }

    /// Matrix of one entity.
    pub fn matrix(&self, entity: &str) -> Option<&ScoreMatrix> {
        self.matrices.get(entity)
    }

    /// Every matrix in first-append order.
    pub fn matrices(&self) -> impl Iterator<Item = &ScoreMatrix> {
        self.matrices.values()
    }

    /// Entity names in first-append order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.matrices.keys().map(String::as_str)
    }

    /// Summary across every entity.
    pub fn summary(&self) -> Summary {
        let matrices: Vec<&ScoreMatrix> = self.matrices.values().collect();
        summary(&matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> MetricRow {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_append_drops_timing_keys() {
        let mut matrix = ScoreMatrix::new("knn");
        for fold in 0..4 {
            matrix.append(
                0,
                fold,
                &metrics(&[
                    ("fit_time", 0.3),
                    ("accuracy", 0.5 + fold as f64 / 10.0),
                    ("f1", 0.4),
                    ("score_time", 0.01),
                ]),
            );
        }
        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix.columns, vec!["accuracy", "f1"]);
        assert!(matrix.rows.iter().all(|row| row.values.len() == 2));
        assert!((matrix.mean("accuracy") - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_new_keys_are_backfilled() {
        let mut matrix = ScoreMatrix::new("voter");
        matrix.append(0, 0, &metrics(&[("accuracy", 1.0)]));
        matrix.append(0, 1, &metrics(&[("accuracy", 0.0), ("f1", 0.5)]));
        assert!(matrix.rows[0].values[1].is_nan());
        assert_eq!(matrix.mean("f1"), 0.5);
        assert_eq!(matrix.mean("accuracy"), 0.5);
    }

    #[test]
    fn test_summary_aligns_columns() {
        let mut accumulator = ScoreAccumulator::new();
        accumulator.append("a", 0, 0, &metrics(&[("accuracy", 0.8), ("f1", 0.6)]));
        accumulator.append("a", 0, 1, &metrics(&[("accuracy", 0.6), ("f1", 0.4)]));
        accumulator.append("b", 0, 0, &metrics(&[("f1", 0.9), ("accuracy", 0.7)]));

        let summary = accumulator.summary();
        assert_eq!(summary.columns, vec!["accuracy", "f1"]);
        assert!((summary.get("a", "accuracy").unwrap() - 0.7).abs() < 1e-12);
        assert!((summary.get("b", "f1").unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(accumulator.entities().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
