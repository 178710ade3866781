//! Plurality vote over the agents' hard labels.

use crate::aggregation::strategy::{AggregationContext, AggregationResult, Aggregator, Ranking};
use crate::core::{ClassIndex, Error, Result};
use ndarray::Array1;

/// Majority voter with a priority tie-break.
#[derive(Clone, Debug)]
pub struct Voter {
    name: String,
    /// Agent positions, most trusted first; covers every agent
    order: Vec<usize>,
}

impl Voter {
    /// Create a voter from agent positions.
    ///
    /// Agents missing from `priority` follow in agent order.
    pub fn new(name: &str, priority: &[usize], n_agents: usize) -> Self {
        let mut order: Vec<usize> = Vec::with_capacity(n_agents);
        for &agent in priority {
            if agent < n_agents && !order.contains(&agent) {
                order.push(agent);
            }
        }
        order.extend((0..n_agents).filter(|agent| !priority.contains(agent)));
        Self {
            name: name.to_string(),
            order,
        }
    }

    /// Create a voter from learner names.
    pub fn from_names<S: AsRef<str>>(
        name: &str,
        priority: &[S],
        learners: &[String],
    ) -> Result<Self> {
        let positions = priority
            .iter()
            .map(|wanted| {
                let wanted = wanted.as_ref();
                learners
                    .iter()
                    .position(|learner| learner == wanted)
                    .ok_or_else(|| Error::UnknownLearner(wanted.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, &positions, learners.len()))
    }

    /// Agent positions in tie-break order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn vote(&self, ballots: &[ClassIndex], n_classes: usize) -> ClassIndex {
        let mut counts = vec![0usize; n_classes];
        for &class in ballots {
            if let Some(count) = counts.get_mut(class) {
                *count += 1;
            }
        }
        let top = counts.iter().copied().max().unwrap_or(0);

        self.order
            .iter()
            .filter_map(|&agent| ballots.get(agent).copied())
            .find(|&class| counts.get(class) == Some(&top))
            .unwrap_or(0)
    }
}

impl Aggregator for Voter {
    fn name(&self) -> &str {
        &self.name
    }

    fn aggregate(&self, ctx: &AggregationContext<'_>) -> Result<AggregationResult> {
        let mut ballots = Vec::with_capacity(ctx.n_agents());
        let winners: Array1<ClassIndex> = (0..ctx.n_rows())
            .map(|row| {
                ballots.clear();
                ballots.extend(ctx.predictions.iter().map(|labels| labels[row]));
                self.vote(&ballots, ctx.n_classes())
            })
            .collect();

        let ranking = Ranking::majority_winner(&winners, ctx.class_names);
        Ok(AggregationResult::scored(&self.name, ranking, winners, ctx))
    }
}
