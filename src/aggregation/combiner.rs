//! Stacking over the agents' validation probabilities.

use crate::aggregation::strategy::{AggregationContext, AggregationResult, Aggregator, Ranking};
use crate::classifier::ClassifierSpec;
use crate::core::{Error, Result};
use ndarray::{concatenate, Array2, Axis};

/// Meta-classifier trained on concatenated agent probabilities.
#[derive(Clone, Debug)]
pub struct Combiner {
    name: String,
    meta: ClassifierSpec,
}

impl Combiner {
    /// Create a combiner.
    pub fn new(name: &str, meta: ClassifierSpec) -> Self {
        Self {
            name: name.to_string(),
            meta,
        }
    }

    /// Meta-classifier description.
    pub fn meta(&self) -> &ClassifierSpec {
        &self.meta
    }

    fn fit_error(&self, reason: impl ToString) -> Error {
        Error::FitFailed {
            learner: self.name.clone(),
            reason: reason.to_string(),
        }
    }

    fn stack(&self, probas: &[Array2<f64>]) -> Result<Array2<f64>> {
        let views: Vec<_> = probas.iter().map(|proba| proba.view()).collect();
        concatenate(Axis(1), &views).map_err(|err| self.fit_error(err))
    }
}

impl Aggregator for Combiner {
    fn name(&self) -> &str {
        &self.name
    }

    fn aggregate(&self, ctx: &AggregationContext<'_>) -> Result<AggregationResult> {
        let train = self.stack(ctx.validation_probas)?;
        let test = self.stack(ctx.test_probas)?;

        let mut meta = self.meta.build();
        meta.fit(train.view(), ctx.validation_labels, ctx.n_classes())
            .map_err(|err| self.fit_error(err))?;
        let winners = meta.predict(test.view())?;

        let ranking = Ranking::majority_winner(&winners, ctx.class_names);
        Ok(AggregationResult::scored(&self.name, ranking, winners, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FoldOutputs;
    use ndarray::array;

    #[test]
    fn test_stacking_fits_on_validation_probabilities() {
        // agent1 is inverted but just as informative
        let right = array![[0.9, 0.1], [0.2, 0.8], [0.8, 0.2], [0.1, 0.9]];
        let wrong = array![[0.1, 0.9], [0.8, 0.2], [0.2, 0.8], [0.9, 0.1]];
        let outputs = FoldOutputs::from_probas(vec![0, 1, 0, 1], vec![right, wrong]);

        let combiner = Combiner::new("combiner", ClassifierSpec::logistic_regression());
        let result = combiner.aggregate(&outputs.context()).unwrap();
        assert_eq!(result.winners.to_vec(), vec![0, 1, 0, 1]);
        assert_eq!(result.scores["accuracy"], 1.0);
    }

    #[test]
    fn test_single_class_validation_is_a_fit_error() {
        let mut outputs = FoldOutputs::from_probas(
            vec![0, 1],
            vec![array![[0.7, 0.3], [0.4, 0.6]]],
        );
        outputs.validation_labels = array![1, 1];

        let combiner = Combiner::new("combiner", ClassifierSpec::gaussian_nb());
        let err = combiner.aggregate(&outputs.context()).unwrap_err();
        assert!(err.is_fit());
        assert!(err.to_string().contains("combiner"));
    }
}
