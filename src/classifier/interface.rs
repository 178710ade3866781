//! Local classifier contract.
//!
//! Every agent owns one boxed [`Classifier`]. Probability columns always
//! follow the dataset's encoded class order, even when a training slice
//! misses a class, so aggregators can combine outputs column by column.

use crate::classifier::{GaussianNb, KNearest, LogisticRegression};
use crate::core::{argmax, ClassIndex, Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// A trainable probabilistic classifier.
pub trait Classifier: Send {
    /// Model family name.
    fn name(&self) -> &str;

    /// Train on `x` (rows = instances) against encoded labels `y`.
    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, ClassIndex>,
        n_classes: usize,
    ) -> Result<()>;

    /// Class probabilities, one row per instance and one column per class.
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>>;

    /// Forget everything learned by a previous `fit`.
    fn reset(&mut self);

    /// Hard labels: row-wise arg-max of [`Classifier::predict_proba`].
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<ClassIndex>> {
        let proba = self.predict_proba(x)?;
        Ok(proba_to_labels(&proba))
    }
}

/// Row-wise arg-max, ties to the lowest class.
pub fn proba_to_labels(proba: &Array2<f64>) -> Array1<ClassIndex> {
    proba
        .axis_iter(Axis(0))
        .map(|row| match row.as_slice() {
            Some(values) => argmax(values),
            None => argmax(&row.to_vec()),
        })
        .collect()
}

/// Reject training data no classifier can learn from.
pub fn validate_training(
    x: &ArrayView2<'_, f64>,
    y: &ArrayView1<'_, ClassIndex>,
    n_classes: usize,
) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(Error::DegenerateTrainingData(format!(
            "{} rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 {
        return Err(Error::DegenerateTrainingData("no training rows".to_string()));
    }
    if let Some(bad) = y.iter().find(|&&class| class >= n_classes) {
        return Err(Error::DegenerateTrainingData(format!(
            "label {} outside {} classes",
            bad, n_classes
        )));
    }
    let first = y[0];
    if y.iter().all(|&class| class == first) {
        return Err(Error::DegenerateTrainingData(format!(
            "training slice only contains class {}",
            first
        )));
    }
    Ok(())
}

/// Declarative description of a classifier, as found in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Gaussian naive Bayes
    GaussianNb {
        #[serde(default = "default_var_smoothing")]
        var_smoothing: f64,
    },
    /// k nearest neighbours
    Knn {
        #[serde(default = "default_k")]
        k: usize,
    },
    /// Multinomial logistic regression
    LogisticRegression {
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        #[serde(default = "default_epochs")]
        epochs: usize,
        #[serde(default)]
        l2: f64,
    },
}

fn default_var_smoothing() -> f64 {
    1e-9
}

fn default_k() -> usize {
    5
}

fn default_learning_rate() -> f64 {
    0.5
}

fn default_epochs() -> usize {
    200
}

impl ClassifierSpec {
    /// Gaussian naive Bayes with default smoothing.
    pub fn gaussian_nb() -> Self {
        Self::GaussianNb {
            var_smoothing: default_var_smoothing(),
        }
    }

    /// k-NN with the given neighbour count.
    pub fn knn(k: usize) -> Self {
        Self::Knn { k }
    }

    /// Logistic regression with default hyper-parameters.
    pub fn logistic_regression() -> Self {
        Self::LogisticRegression {
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            l2: 0.0,
        }
    }

    /// Check hyper-parameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::GaussianNb { var_smoothing } if *var_smoothing < 0.0 => Err(
                Error::InvalidConfig("var_smoothing must be non-negative".to_string()),
            ),
            Self::Knn { k } if *k == 0 => {
                Err(Error::InvalidConfig("knn needs k >= 1".to_string()))
            }
            Self::LogisticRegression {
                learning_rate,
                epochs,
                l2,
            } if *learning_rate <= 0.0 || *epochs == 0 || *l2 < 0.0 => Err(
                Error::InvalidConfig(
                    "logistic regression needs a positive learning rate and epochs".to_string(),
                ),
            ),
            _ => Ok(()),
        }
    }

    /// Instantiate an unfitted classifier.
    pub fn build(&self) -> Box<dyn Classifier> {
        match self {
            Self::GaussianNb { var_smoothing } => Box::new(GaussianNb::new(*var_smoothing)),
            Self::Knn { k } => Box::new(KNearest::new(*k)),
            Self::LogisticRegression {
                learning_rate,
                epochs,
                l2,
            } => Box::new(LogisticRegression::new(*learning_rate, *epochs, *l2)),
        }
    }
}
