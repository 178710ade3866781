//! Multinomial logistic regression trained by full-batch gradient descent.

use crate::classifier::interface::{validate_training, Classifier};
use crate::core::{ClassIndex, Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Softmax regression over standardised inputs.
///
/// Weights start at zero, so training is deterministic for a given input.
#[derive(Clone, Debug)]
pub struct LogisticRegression {
    learning_rate: f64,
    epochs: usize,
    l2: f64,
    state: Option<LogisticState>,
}

#[derive(Clone, Debug)]
struct LogisticState {
    means: Array1<f64>,
    scales: Array1<f64>,
    /// `n_features x n_classes`
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticState {
    fn standardize(&self, x: &ArrayView2<'_, f64>) -> Array2<f64> {
        (x - &self.means) / &self.scales
    }

    fn probabilities(&self, z: &Array2<f64>) -> Array2<f64> {
        let mut logits = z.dot(&self.weights) + &self.bias;
        for mut row in logits.axis_iter_mut(Axis(0)) {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            row.mapv_inplace(|value| (value - max).exp());
            let sum = row.sum();
            row /= sum;
        }
        logits
    }
}

impl LogisticRegression {
    /// Create an unfitted model.
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            state: None,
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, ClassIndex>,
        n_classes: usize,
    ) -> Result<()> {
        validate_training(&x, &y, n_classes)?;
        let n_rows = x.nrows() as f64;
        let n_features = x.ncols();

        let means = x
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::DegenerateTrainingData("no training rows".to_string()))?;
        let scales = x
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > 1e-12 { std } else { 1.0 });

        let mut state = LogisticState {
            means,
            scales,
            weights: Array2::zeros((n_features, n_classes)),
            bias: Array1::zeros(n_classes),
        };
        let z = state.standardize(&x);

        let mut one_hot = Array2::<f64>::zeros((x.nrows(), n_classes));
        for (row, &class) in y.iter().enumerate() {
            one_hot[[row, class]] = 1.0;
        }

        for _ in 0..self.epochs {
            let error = state.probabilities(&z) - &one_hot;
            let grad_w = z.t().dot(&error) / n_rows + &state.weights * self.l2;
            let grad_b = error.sum_axis(Axis(0)) / n_rows;
            state.weights.scaled_add(-self.learning_rate, &grad_w);
            state.bias.scaled_add(-self.learning_rate, &grad_b);
        }

        self.state = Some(state);
        Ok(())
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let state = self.state.as_ref().ok_or(Error::NotFitted)?;
        Ok(state.probabilities(&state.standardize(&x)))
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
    fn test_learns_three_blobs() {
        let data = blobs(15, 3, 2, 8);
        let mut model = LogisticRegression::new(0.5, 300, 0.0);
        model.fit(data.x(), data.y(), 3).unwrap();

        let predictions = model.predict(data.x()).unwrap();
        let correct = predictions
            .iter()
            .zip(data.y().iter())
            .filter(|(p, y)| p == y)
            .count();
        assert!(correct as f64 / data.n_rows() as f64 > 0.9);
    }

    #[test]
    fn test_training_is_deterministic() {
        let data = blobs(10, 2, 3, 2);
        let mut first = LogisticRegression::new(0.3, 50, 0.01);
        let mut second = LogisticRegression::new(0.3, 50, 0.01);
        first.fit(data.x(), data.y(), 2).unwrap();
        second.fit(data.x(), data.y(), 2).unwrap();
        assert_eq!(
            first.predict_proba(data.x()).unwrap(),
            second.predict_proba(data.x()).unwrap()
        );
    }

    #[test]
    fn test_constant_feature_is_tolerated() {
        let x = ndarray::array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = ndarray::array![0, 0, 1, 1];
        let mut model = LogisticRegression::new(0.5, 100, 0.0);
        model.fit(x.view(), y.view(), 2).unwrap();
        let proba = model.predict_proba(x.view()).unwrap();
        assert!(proba.iter().all(|p| p.is_finite()));
        assert_eq!(model.predict(x.view()).unwrap().to_vec(), vec![0, 0, 1, 1]);
    }
}
