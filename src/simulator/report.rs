//! Results of a simulation run.

use crate::aggregation::Ranking;
use crate::core::Timestamp;
use crate::metrics::{ScoreAccumulator, Summary};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ranking produced by one entity on one fold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankRow {
    /// Iteration, from 0
    pub iteration: usize,
    /// Fold within the iteration, from 0
    pub fold: usize,
    /// Candidates from best to worst
    pub ranking: Ranking,
}

/// Every fold ranking of one aggregation entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    pub entity: String,
    pub rows: Vec<RankRow>,
}

impl RankTable {
    /// Create an empty table.
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            rows: Vec::new(),
        }
    }

    /// Record one fold's ranking.
    pub fn push(&mut self, iteration: usize, fold: usize, ranking: Ranking) {
        self.rows.push(RankRow {
            iteration,
            fold,
            ranking,
        });
    }

    /// How often each candidate finished first.
    pub fn win_counts(&self) -> IndexMap<String, usize> {
        let mut counts = IndexMap::new();
        for row in &self.rows {
            if let Some(winner) = row.ranking.winner() {
                *counts.entry(winner.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// A fold (or one entity within it) that produced no scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailedFold {
    /// Iteration, from 0
    pub iteration: usize,
    /// Fold within the iteration, from 0
    pub fold: usize,
    /// Entity that failed; `None` when the whole fold was skipped
    pub entity: Option<String>,
    /// Error message of the failure
    pub reason: String,
}

/// Everything a finished run produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Run start time
    pub started_at: Timestamp,
    /// Run end time
    pub finished_at: Timestamp,
    /// Base seed; iteration `i` used `seed + i`
    pub seed: u64,
    /// Per-entity score matrices
    pub scores: ScoreAccumulator,
    /// Per-entity fold rankings
    pub ranks: IndexMap<String, RankTable>,
    /// Folds skipped because of fit errors
    pub failed_folds: Vec<FailedFold>,
}

impl SimulationReport {
    /// Column-aligned means of every entity.
    pub fn summary(&self) -> Summary {
        self.scores.summary()
    }

    /// Whether any fold or entity was skipped.
    pub fn has_failures(&self) -> bool {
        !self.failed_folds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_counts() {
        let mut table = RankTable::new("borda");
        table.push(0, 0, Ranking::single("a"));
        table.push(0, 1, Ranking::single("b"));
        table.push(1, 0, Ranking::single("a"));
        table.push(1, 1, Ranking::default());

        let counts = table.win_counts();
        assert_eq!(counts["a"], 2);
        assert_eq!(counts["b"], 1);
        assert_eq!(counts.len(), 2);
    }
}
