//! Simulated agent owning one classifier and one feature partition.
//!
//! Lifecycle: `Unbound → Bound → Fitting → Fitted → Evaluated`. A learner
//! is created once per simulation and rebound every iteration; the
//! classifier is reset each time fitting starts.

use crate::classifier::{proba_to_labels, Classifier};
use crate::core::{ClassIndex, Error, Result};
use crate::data::Dataset;
use crate::metrics::{MetricRow, ScorerSet};
use crate::split::Fold;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle state of a learner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnerState {
    /// No dataset view yet
    Unbound,
    /// Dataset and partition assigned
    Bound,
    /// Classifier training in progress
    Fitting,
    /// Classifier trained for the current fold
    Fitted,
    /// Outputs produced for the current fold
    Evaluated,
}

impl LearnerState {
    fn as_str(self) -> &'static str {
        match self {
            LearnerState::Unbound => "Unbound",
            LearnerState::Bound => "Bound",
            LearnerState::Fitting => "Fitting",
            LearnerState::Fitted => "Fitted",
            LearnerState::Evaluated => "Evaluated",
        }
    }
}

/// Outputs of one learner on one fold.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Hard labels on the test slice
    pub y_pred: Array1<ClassIndex>,
    /// Class probabilities on the validation slice
    pub proba_validation: Array2<f64>,
    /// Class probabilities on the test slice
    pub proba_test: Array2<f64>,
    /// Scorer values plus `fit_time` / `score_time` in seconds
    pub metrics: MetricRow,
}

/// A classifier bound to a feature partition of the shared dataset.
pub struct Learner {
    name: String,
    classifier: Box<dyn Classifier>,
    features: Vec<usize>,
    dataset: Option<Arc<Dataset>>,
    state: LearnerState,
    fit_time: f64,
}

impl std::fmt::Debug for Learner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Learner")
            .field("name", &self.name)
            .field("classifier", &self.classifier.name())
            .field("features", &self.features)
            .field("state", &self.state)
            .finish()
    }
}

impl Learner {
    /// Create an unbound learner.
    pub fn new(name: &str, classifier: Box<dyn Classifier>) -> Self {
        Self {
            name: name.to_string(),
            classifier,
            features: Vec::new(),
            dataset: None,
            state: LearnerState::Unbound,
            fit_time: 0.0,
        }
    }

    /// Attach the shared dataset and this learner's columns.
    pub fn bind(&mut self, dataset: Arc<Dataset>, features: Vec<usize>) {
        self.dataset = Some(dataset);
        self.features = features;
        self.state = LearnerState::Bound;
    }

    /// Learner name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned feature columns.
    pub fn features(&self) -> &[usize] {
        &self.features
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LearnerState {
        self.state
    }

    fn bound_dataset(&self) -> Result<Arc<Dataset>> {
        self.dataset.clone().ok_or(Error::InvalidState {
            learner: self.name.clone(),
            expected: "Bound",
            found: self.state.as_str(),
        })
    }

    /// Train on rows already restricted to this learner's columns.
    pub fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, ClassIndex>) -> Result<()> {
        let dataset = self.bound_dataset()?;

        self.state = LearnerState::Fitting;
        self.classifier.reset();
        let started = Instant::now();
        let outcome = self.classifier.fit(x, y, dataset.n_classes());
        self.fit_time = started.elapsed().as_secs_f64();

        match outcome {
            Ok(()) => {
                self.state = LearnerState::Fitted;
                Ok(())
            }
            Err(err) => {
                self.state = LearnerState::Bound;
                Err(Error::FitFailed {
                    learner: self.name.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Train on the given dataset rows.
    pub fn fit_rows(&mut self, rows: &[usize]) -> Result<()> {
        let dataset = self.bound_dataset()?;
        let x = dataset.select(rows, &self.features);
        let y = dataset.targets(rows);
        self.fit(x.view(), y.view())
    }

    /// Predict the validation and test slices of a fold and score the test slice.
    pub fn evaluate(&mut self, fold: &Fold, scorers: &ScorerSet) -> Result<Evaluation> {
        if self.state != LearnerState::Fitted {
            return Err(Error::InvalidState {
                learner: self.name.clone(),
                expected: "Fitted",
                found: self.state.as_str(),
            });
        }
        let dataset = self.bound_dataset()?;

        let started = Instant::now();
        let proba_validation = self
            .classifier
            .predict_proba(dataset.select(&fold.validation, &self.features).view())?;
        let proba_test = self
            .classifier
            .predict_proba(dataset.select(&fold.test, &self.features).view())?;
        let y_pred = proba_to_labels(&proba_test);

        let y_true = dataset.targets(&fold.test);
        let mut metrics = scorers.evaluate(y_true.view(), y_pred.view());
        metrics.insert("fit_time".to_string(), self.fit_time);
        metrics.insert("score_time".to_string(), started.elapsed().as_secs_f64());

        self.state = LearnerState::Evaluated;
        Ok(Evaluation {
            y_pred,
            proba_validation,
            proba_test,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierSpec;
    use crate::split::StratifiedFoldSplitter;
    use crate::testing::blobs;

    fn bound_learner(features: Vec<usize>) -> (Learner, Arc<Dataset>) {
        let dataset = Arc::new(blobs(15, 2, 4, 3));
        let mut learner = Learner::new("nb", ClassifierSpec::gaussian_nb().build());
        learner.bind(dataset.clone(), features);
        (learner, dataset)
    }

    #[test]
    fn test_lifecycle() {
        let (mut learner, dataset) = bound_learner(vec![0, 2]);
        assert_eq!(learner.state(), LearnerState::Bound);

        let fold = StratifiedFoldSplitter::new(5)
            .unwrap()
            .split(dataset.y(), 0)
            .unwrap()
            .next()
            .unwrap();
        learner.fit_rows(&fold.train).unwrap();
        assert_eq!(learner.state(), LearnerState::Fitted);

        let scorers = ScorerSet::resolve(&["accuracy"]).unwrap();
        let evaluation = learner.evaluate(&fold, &scorers).unwrap();
        assert_eq!(learner.state(), LearnerState::Evaluated);
        assert_eq!(evaluation.y_pred.len(), fold.test.len());
        assert_eq!(evaluation.proba_validation.nrows(), fold.validation.len());
        assert_eq!(evaluation.proba_test.ncols(), 2);
        assert!(evaluation.metrics.contains_key("fit_time"));
        assert!(evaluation.metrics["accuracy"] > 0.9);
    }

    #[test]
    fn test_evaluate_requires_fit() {
        let (mut learner, dataset) = bound_learner(vec![1]);
        let fold = StratifiedFoldSplitter::new(3)
            .unwrap()
            .split(dataset.y(), 0)
            .unwrap()
            .next()
            .unwrap();
        let scorers = ScorerSet::resolve(&["accuracy"]).unwrap();
        assert!(matches!(
            learner.evaluate(&fold, &scorers),
            Err(Error::InvalidState { expected: "Fitted", .. })
        ));
    }

    #[test]
    fn test_unbound_learner_cannot_fit() {
        let mut learner = Learner::new("knn", ClassifierSpec::knn(1).build());
        assert!(matches!(
            learner.fit_rows(&[0, 1]),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_single_class_fold_is_a_fit_error() {
        let (mut learner, dataset) = bound_learner(vec![0]);
        let class_zero: Vec<usize> = (0..dataset.n_rows())
            .filter(|&row| dataset.y()[row] == 0)
            .collect();
        let err = learner.fit_rows(&class_zero).unwrap_err();
        assert!(err.is_fit());
        assert_eq!(learner.state(), LearnerState::Bound);
    }
}
