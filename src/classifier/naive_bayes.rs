//! Gaussian naive Bayes.

use crate::classifier::interface::{validate_training, Classifier};
use crate::core::{ClassIndex, Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Per-class Gaussian likelihoods with independent features.
#[derive(Clone, Debug)]
pub struct GaussianNb {
    var_smoothing: f64,
    state: Option<NbState>,
}

#[derive(Clone, Debug)]
struct NbState {
    /// log prior per class, `None` for classes absent from training
    log_priors: Vec<Option<f64>>,
    means: Array2<f64>,
    variances: Array2<f64>,
}

impl GaussianNb {
    /// Create an unfitted model.
    pub fn new(var_smoothing: f64) -> Self {
        Self {
            var_smoothing,
            state: None,
        }
    }
}

impl Classifier for GaussianNb {
    fn name(&self) -> &str {
        "gaussian_nb"
    }

    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, ClassIndex>,
        n_classes: usize,
    ) -> Result<()> {
        validate_training(&x, &y, n_classes)?;
        let n_features = x.ncols();

        // sklearn-style epsilon: a fraction of the largest feature variance
        let max_variance = x
            .var_axis(Axis(0), 0.0)
            .iter()
            .cloned()
            .fold(0.0_f64, f64::max);
        let epsilon = (self.var_smoothing * max_variance).max(1e-12);

        let mut counts = vec![0usize; n_classes];
        let mut means = Array2::<f64>::zeros((n_classes, n_features));
        let mut variances = Array2::<f64>::zeros((n_classes, n_features));

        for (row, &class) in x.axis_iter(Axis(0)).zip(y.iter()) {
            counts[class] += 1;
            let mut mean = means.row_mut(class);
            mean += &row;
        }
        for class in 0..n_classes {
            if counts[class] > 0 {
                let mut mean = means.row_mut(class);
                mean /= counts[class] as f64;
            }
        }
        for (row, &class) in x.axis_iter(Axis(0)).zip(y.iter()) {
            let diff = &row - &means.row(class);
            let mut variance = variances.row_mut(class);
            variance += &diff.mapv(|d| d * d);
        }
        for class in 0..n_classes {
            let mut variance = variances.row_mut(class);
            if counts[class] > 0 {
                variance /= counts[class] as f64;
            }
            variance += epsilon;
        }

        let total = y.len() as f64;
        let log_priors = counts
            .iter()
            .map(|&count| (count > 0).then(|| (count as f64 / total).ln()))
            .collect();

        self.state = Some(NbState {
            log_priors,
            means,
            variances,
        });
        Ok(())
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let state = self.state.as_ref().ok_or(Error::NotFitted)?;
        let n_classes = state.log_priors.len();
        let mut proba = Array2::<f64>::zeros((x.nrows(), n_classes));

        for (row, mut out) in x.axis_iter(Axis(0)).zip(proba.axis_iter_mut(Axis(0))) {
            let joint: Vec<Option<f64>> = (0..n_classes)
                .map(|class| {
                    state.log_priors[class].map(|prior| {
                        let mean = state.means.row(class);
                        let variance = state.variances.row(class);
                        let log_likelihood: f64 = row
                            .iter()
                            .zip(mean.iter().zip(variance.iter()))
                            .map(|(&value, (&mu, &var))| {
                                -0.5 * ((2.0 * std::f64::consts::PI * var).ln()
                                    + (value - mu).powi(2) / var)
                            })
                            .sum();
                        prior + log_likelihood
                    })
                })
                .collect();

            let max = joint
                .iter()
                .flatten()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let norm: f64 = joint.iter().flatten().map(|&value| (value - max).exp()).sum();
            for (class, value) in joint.iter().enumerate() {
                out[class] = value.map_or(0.0, |value| (value - max).exp() / norm);
            }
        }

        Ok(proba)
    }

    fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::blobs;

    #[test]
    fn test_separates_blobs() {
        let data = blobs(20, 2, 3, 1);
        let mut model = GaussianNb::new(1e-9);
        model.fit(data.x(), data.y(), 2).unwrap();

        let predictions = model.predict(data.x()).unwrap();
        let correct = predictions
            .iter()
            .zip(data.y().iter())
            .filter(|(p, y)| p == y)
            .count();
        assert!(correct >= 38);
    }

    #[test]
    fn test_probabilities_sum_to_one_and_cover_missing_classes() {
        let data = blobs(10, 2, 2, 4);
        let mut model = GaussianNb::new(1e-9);
        // three dataset classes, only two present in training
        model.fit(data.x(), data.y(), 3).unwrap();
        let proba = model.predict_proba(data.x()).unwrap();
        assert_eq!(proba.ncols(), 3);
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert_eq!(row[2], 0.0);
        }
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let data = blobs(2, 2, 1, 0);
        let model = GaussianNb::new(1e-9);
        assert!(matches!(model.predict_proba(data.x()), Err(Error::NotFitted)));
    }
}
