//! Elementwise statistics over the agents' probability rows.

use crate::aggregation::strategy::{AggregationContext, AggregationResult, Aggregator, Ranking};
use crate::core::{argmax, ClassIndex, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Statistic applied per cell across agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatMethod {
    Mean,
    Median,
}

impl StatMethod {
    /// Entity name.
    pub fn name(&self) -> &'static str {
        match self {
            StatMethod::Mean => "mean",
            StatMethod::Median => "median",
        }
    }

    /// Reduce one cell's values. Empty input yields 0.
    pub fn reduce(&self, values: &mut [f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            StatMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
            StatMethod::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        }
    }
}

/// Aggregator combining probabilities with a [`StatMethod`].
#[derive(Clone, Debug)]
pub struct Mathematician {
    method: StatMethod,
}

impl Mathematician {
    /// Create a mathematician; its entity name is the method name.
    pub fn new(method: StatMethod) -> Self {
        Self { method }
    }

    /// Combined probability matrix, rows × classes.
    pub fn combine(&self, probas: &[Array2<f64>], n_rows: usize, n_classes: usize) -> Array2<f64> {
        let mut cell = Vec::with_capacity(probas.len());
        Array2::from_shape_fn((n_rows, n_classes), |(row, class)| {
            cell.clear();
            cell.extend(probas.iter().map(|proba| proba[[row, class]]));
            self.method.reduce(&mut cell)
        })
    }
}

impl Aggregator for Mathematician {
    fn name(&self) -> &str {
        self.method.name()
    }

    fn aggregate(&self, ctx: &AggregationContext<'_>) -> Result<AggregationResult> {
        let combined = self.combine(ctx.test_probas, ctx.n_rows(), ctx.n_classes());
        let winners: Array1<ClassIndex> = combined
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()))
            .collect();

        let totals = combined.sum_axis(ndarray::Axis(0)).to_vec();
        let ranking = Ranking::from_scores(&totals, ctx.class_names);
        Ok(AggregationResult::scored(self.name(), ranking, winners, ctx))
    }
}
