//! Social-choice arbiters.
//!
//! Every agent's probability row is read as a ballot: classes ordered by
//! descending probability, ties by class order. A rule turns the ballots of
//! one test row into a score per class; the row's winner is the arg-max and
//! the fold ranking orders classes by their scores summed over all rows.

use crate::aggregation::strategy::{AggregationContext, AggregationResult, Aggregator, Ranking};
use crate::core::{argmax, ClassIndex, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Rank-aggregation rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialChoiceRule {
    /// Position `r` of `m` earns `m - r`
    Borda,
    /// Position `r` earns `1 / r`
    Dowdall,
    /// Pairwise majority: +1 win, -1 loss, 0 tie
    Copeland,
    /// Maximin over pairwise support
    Simpson,
}

impl SocialChoiceRule {
    /// Every rule, in registry order.
    pub const ALL: [SocialChoiceRule; 4] = [
        SocialChoiceRule::Borda,
        SocialChoiceRule::Dowdall,
        SocialChoiceRule::Copeland,
        SocialChoiceRule::Simpson,
    ];

    /// Entity name.
    pub fn name(&self) -> &'static str {
        match self {
            SocialChoiceRule::Borda => "borda",
            SocialChoiceRule::Dowdall => "dowdall",
            SocialChoiceRule::Copeland => "copeland",
            SocialChoiceRule::Simpson => "simpson",
        }
    }

    /// Score every candidate from a profile of complete ballots.
    pub fn score(&self, profile: &[Vec<ClassIndex>], n_candidates: usize) -> Vec<f64> {
        let mut scores = vec![0.0; n_candidates];
        match self {
            SocialChoiceRule::Borda => {
                for ballot in profile {
                    for (pos, &class) in ballot.iter().enumerate() {
                        scores[class] += (n_candidates - (pos + 1)) as f64;
                    }
                }
            }
            SocialChoiceRule::Dowdall => {
                for ballot in profile {
                    for (pos, &class) in ballot.iter().enumerate() {
                        scores[class] += 1.0 / (pos + 1) as f64;
                    }
                }
            }
            SocialChoiceRule::Copeland => {
                let support = pairwise_support(profile, n_candidates);
                for a in 0..n_candidates {
                    for b in (a + 1)..n_candidates {
                        match support[a][b].cmp(&support[b][a]) {
                            std::cmp::Ordering::Greater => {
                                scores[a] += 1.0;
                                scores[b] -= 1.0;
                            }
                            std::cmp::Ordering::Less => {
                                scores[a] -= 1.0;
                                scores[b] += 1.0;
                            }
                            std::cmp::Ordering::Equal => {}
                        }
                    }
                }
            }
            SocialChoiceRule::Simpson => {
                let support = pairwise_support(profile, n_candidates);
                for (a, score) in scores.iter_mut().enumerate() {
                    *score = (0..n_candidates)
                        .filter(|&b| b != a)
                        .map(|b| support[a][b])
                        .min()
                        .unwrap_or(0) as f64;
                }
            }
        }
        scores
    }
}

/// Classes by descending probability, ties in class order.
pub fn preference_order(probabilities: &[f64]) -> Vec<ClassIndex> {
    let mut order: Vec<ClassIndex> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]).then(a.cmp(&b)));
    order
}

/// `support[a][b]` = number of ballots ranking `a` above `b`.
pub fn pairwise_support(profile: &[Vec<ClassIndex>], n_candidates: usize) -> Vec<Vec<usize>> {
    let mut support = vec![vec![0usize; n_candidates]; n_candidates];
    let mut position = vec![0usize; n_candidates];
    for ballot in profile {
        for (pos, &class) in ballot.iter().enumerate() {
            position[class] = pos;
        }
        for a in 0..n_candidates {
            for b in 0..n_candidates {
                if a != b && position[a] < position[b] {
                    support[a][b] += 1;
                }
            }
        }
    }
    support
}

/// Aggregator applying one [`SocialChoiceRule`] per test row.
///
/// Candidates are the dataset's classes. When fewer than two of them get
/// any probability mass on the fold's test rows, the election is trivial:
/// the ranking holds that one candidate without a score.
#[derive(Clone, Debug)]
pub struct Arbiter {
    rule: SocialChoiceRule,
}

impl Arbiter {
    /// Create an arbiter for `rule`; its entity name is the rule name.
    pub fn new(rule: SocialChoiceRule) -> Self {
        Self { rule }
    }

    /// Scoring rule.
    pub fn rule(&self) -> SocialChoiceRule {
        self.rule
    }
}

/// Classes with non-zero probability from at least one agent.
fn classes_with_mass(ctx: &AggregationContext<'_>) -> Vec<ClassIndex> {
    (0..ctx.n_classes())
        .filter(|&class| {
            ctx.test_probas
                .iter()
                .any(|proba| proba.column(class).iter().any(|&p| p > 0.0))
        })
        .collect()
}

impl Aggregator for Arbiter {
    fn name(&self) -> &str {
        self.rule.name()
    }

    fn aggregate(&self, ctx: &AggregationContext<'_>) -> Result<AggregationResult> {
        let m = ctx.n_classes();
        let candidates = classes_with_mass(ctx);
        if candidates.len() < 2 {
            let winner = candidates.first().copied().unwrap_or(0);
            let winners = Array1::from_elem(ctx.n_rows(), winner);
            let ranking = ctx
                .class_names
                .get(winner)
                .map_or_else(Ranking::default, |name| Ranking::single(name));
            return Ok(AggregationResult::scored(self.name(), ranking, winners, ctx));
        }

        let mut totals = vec![0.0; m];
        let mut profile = Vec::with_capacity(ctx.n_agents());
        let winners: Array1<ClassIndex> = (0..ctx.n_rows())
            .map(|row| {
                profile.clear();
                profile.extend(
                    ctx.test_probas
                        .iter()
                        .map(|proba| preference_order(&proba.row(row).to_vec())),
                );
                let scores = self.rule.score(&profile, m);
                for (total, score) in totals.iter_mut().zip(&scores) {
                    *total += score;
                }
                argmax(&scores)
            })
            .collect();

        let ranking = Ranking::from_scores(&totals, ctx.class_names);
        Ok(AggregationResult::scored(self.name(), ranking, winners, ctx))
    }
}
