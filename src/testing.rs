//! Seeded synthetic datasets for unit tests.

use crate::aggregation::AggregationContext;
use crate::classifier::{proba_to_labels, Classifier};
use crate::core::{seeded_rng, ClassIndex, Error, Result};
use crate::data::Dataset;
use crate::metrics::ScorerSet;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;

/// Gaussian-ish blobs: class `c` is centred at `2c` on every feature.
pub(crate) fn blobs(per_class: usize, n_classes: usize, n_features: usize, seed: u64) -> Dataset {
    let mut rng = seeded_rng(seed);
    let rows = per_class * n_classes;
    let mut values = Vec::with_capacity(rows * n_features);
    let mut labels = Vec::with_capacity(rows);

    for row in 0..rows {
        let class = row % n_classes;
        for _ in 0..n_features {
            let noise: f64 = rng.gen_range(-0.9..0.9);
            values.push(2.0 * class as f64 + noise);
        }
        labels.push(class as f64);
    }

    let x = Array2::from_shape_vec((rows, n_features), values).expect("shape matches buffer");
    Dataset::new(x, &labels).expect("synthetic dataset is valid")
}

/// Classifier whose `fit` panics, taking its worker down with it.
pub(crate) struct Panicking;

impl Classifier for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    fn fit(
        &mut self,
        _x: ArrayView2<'_, f64>,
        _y: ArrayView1<'_, ClassIndex>,
        _n_classes: usize,
    ) -> Result<()> {
        panic!("fit exploded")
    }

    fn predict_proba(&self, _x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Err(Error::NotFitted)
    }

    fn reset(&mut self) {}
}

/// Owned per-fold agent outputs for aggregation tests.
pub(crate) struct FoldOutputs {
    pub y_true: Array1<ClassIndex>,
    pub predictions: Vec<Array1<ClassIndex>>,
    pub test_probas: Vec<Array2<f64>>,
    pub validation_probas: Vec<Array2<f64>>,
    pub validation_labels: Array1<ClassIndex>,
    pub learners: Vec<String>,
    pub test_indices: Vec<usize>,
    pub class_names: Vec<String>,
    pub scorers: ScorerSet,
}

impl FoldOutputs {
    /// Outputs where the validation slice mirrors the test slice.
    pub fn from_probas(y_true: Vec<ClassIndex>, probas: Vec<Array2<f64>>) -> Self {
        let n_classes = probas.first().map_or(0, |p| p.ncols());
        let y_true = Array1::from(y_true);
        Self {
            predictions: probas.iter().map(proba_to_labels).collect(),
            validation_probas: probas.clone(),
            validation_labels: y_true.clone(),
            learners: (0..probas.len()).map(|idx| format!("agent{}", idx)).collect(),
            test_indices: (0..y_true.len()).collect(),
            class_names: (0..n_classes).map(|c| c.to_string()).collect(),
            scorers: ScorerSet::resolve(&["accuracy"]).expect("known scorer"),
            test_probas: probas,
            y_true,
        }
    }

    pub fn context(&self) -> AggregationContext<'_> {
        AggregationContext {
            y_true: self.y_true.view(),
            predictions: &self.predictions,
            test_probas: &self.test_probas,
            validation_probas: &self.validation_probas,
            validation_labels: self.validation_labels.view(),
            learners: &self.learners,
            test_indices: &self.test_indices,
            class_names: &self.class_names,
            scorers: &self.scorers,
        }
    }
}
