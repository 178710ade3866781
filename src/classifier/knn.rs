//! k nearest neighbours with uniform weights.

use crate::classifier::interface::{validate_training, Classifier};
use crate::core::{ClassIndex, Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Brute-force Euclidean k-NN.
#[derive(Clone, Debug)]
pub struct KNearest {
    k: usize,
    memory: Option<(Array2<f64>, Array1<ClassIndex>, usize)>,
}

impl KNearest {
    /// Create an unfitted model voting over `k` neighbours.
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            memory: None,
        }
    }
}

impl Classifier for KNearest {
    fn name(&self) -> &str {
        "knn"
    }

    fn fit(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, ClassIndex>,
        n_classes: usize,
    ) -> Result<()> {
        validate_training(&x, &y, n_classes)?;
        self.memory = Some((x.to_owned(), y.to_owned(), n_classes));
        Ok(())
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let (train_x, train_y, n_classes) = self.memory.as_ref().ok_or(Error::NotFitted)?;
        let k = self.k.min(train_x.nrows());
        let mut proba = Array2::<f64>::zeros((x.nrows(), *n_classes));

        for (query, mut out) in x.axis_iter(Axis(0)).zip(proba.axis_iter_mut(Axis(0))) {
            let mut distances: Vec<(f64, usize)> = train_x
                .axis_iter(Axis(0))
                .enumerate()
                .map(|(idx, row)| {
                    let squared: f64 = row
                        .iter()
                        .zip(query.iter())
                        .map(|(a, b)| (a - b).powi(2))
                        .sum();
                    (squared, idx)
                })
                .collect();
            // stable on index so equal distances resolve to the earlier row
            distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            for &(_, idx) in distances.iter().take(k) {
                out[train_y[idx]] += 1.0 / k as f64;
            }
        }

        Ok(proba)
    }

    fn reset(&mut self) {
        self.memory = None;
    }
}
