//! Shared aggregation contract.

use crate::core::{ClassIndex, Result};
use crate::metrics::{MetricRow, ScorerSet};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Everything the learners produced for one fold.
#[derive(Clone, Copy, Debug)]
pub struct AggregationContext<'a> {
    /// True labels of the test slice
    pub y_true: ArrayView1<'a, ClassIndex>,
    /// Per-agent hard labels on the test slice
    pub predictions: &'a [Array1<ClassIndex>],
    /// Per-agent class probabilities on the test slice
    pub test_probas: &'a [Array2<f64>],
    /// Per-agent class probabilities on the validation slice
    pub validation_probas: &'a [Array2<f64>],
    /// True labels of the validation slice
    pub validation_labels: ArrayView1<'a, ClassIndex>,
    /// Learner names, aligned with the per-agent slices
    pub learners: &'a [String],
    /// Dataset rows of the test slice
    pub test_indices: &'a [usize],
    /// Display names of the encoded classes
    pub class_names: &'a [String],
    /// Scorers applied to every strategy's winners
    pub scorers: &'a ScorerSet,
}

impl AggregationContext<'_> {
    /// Number of candidate classes.
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Number of test rows.
    pub fn n_rows(&self) -> usize {
        self.y_true.len()
    }

    /// Number of agents.
    pub fn n_agents(&self) -> usize {
        self.learners.len()
    }
}

/// One ranked candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Candidate name
    pub candidate: String,
    /// Aggregated score, absent for trivial rankings
    pub score: Option<f64>,
}

/// Candidates ordered from most to least preferred.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Candidates from best to worst
    pub entries: Vec<RankEntry>,
}

impl Ranking {
    /// Order candidates by descending score; equal scores keep candidate order.
    pub fn from_scores(scores: &[f64], candidates: &[String]) -> Self {
        let mut order: Vec<usize> = (0..scores.len().min(candidates.len())).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
        Self {
            entries: order
                .into_iter()
                .map(|idx| RankEntry {
                    candidate: candidates[idx].clone(),
                    score: Some(scores[idx]),
                })
                .collect(),
        }
    }

    /// Ranking holding a single unscored candidate.
    pub fn single(candidate: &str) -> Self {
        Self {
            entries: vec![RankEntry {
                candidate: candidate.to_string(),
                score: None,
            }],
        }
    }

    /// Single-winner ranking of the class winning most rows.
    pub fn majority_winner(winners: &Array1<ClassIndex>, candidates: &[String]) -> Self {
        let mut counts = vec![0.0; candidates.len()];
        for &class in winners.iter() {
            if let Some(count) = counts.get_mut(class) {
                *count += 1.0;
            }
        }
        let best = crate::core::argmax(&counts);
        candidates
            .get(best)
            .map_or_else(Self::default, |name| Self::single(name))
    }

    /// Most preferred candidate.
    pub fn winner(&self) -> Option<&str> {
        self.entries.first().map(|entry| entry.candidate.as_str())
    }

    /// 1-based position of a candidate.
    pub fn position(&self, candidate: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.candidate == candidate)
            .map(|idx| idx + 1)
    }

    /// Number of ranked candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Consensus output of one strategy on one fold.
#[derive(Clone, Debug)]
pub struct AggregationResult {
    /// Entity name the scores are filed under
    pub entity: String,
    /// Fold-level ranking of candidates
    pub ranking: Ranking,
    /// Consensus label per test row
    pub winners: Array1<ClassIndex>,
    /// Scorer values of the winners
    pub scores: MetricRow,
}

impl AggregationResult {
    /// Score `winners` with the context's scorers.
    pub fn scored(
        entity: &str,
        ranking: Ranking,
        winners: Array1<ClassIndex>,
        ctx: &AggregationContext<'_>,
    ) -> Self {
        let scores = ctx.scorers.evaluate(ctx.y_true, winners.view());
        Self {
            entity: entity.to_string(),
            ranking,
            winners,
            scores,
        }
    }
}

/// A fusion strategy over the agents' outputs.
pub trait Aggregator: Send + Sync {
    /// Entity name of this strategy.
    fn name(&self) -> &str;

    /// Produce the consensus for one fold.
    fn aggregate(&self, ctx: &AggregationContext<'_>) -> Result<AggregationResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_ranking_from_scores() {
        let ranking = Ranking::from_scores(&[1.0, 3.0, 1.0], &names(3));
        let order: Vec<&str> = ranking.entries.iter().map(|e| e.candidate.as_str()).collect();
        assert_eq!(order, vec!["1", "0", "2"]);
        assert_eq!(ranking.winner(), Some("1"));
        assert_eq!(ranking.position("2"), Some(3));
    }

    #[test]
    fn test_majority_winner() {
        let ranking = Ranking::majority_winner(&array![2, 0, 2, 1], &names(3));
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.winner(), Some("2"));
        assert_eq!(ranking.entries[0].score, None);
    }
}
