//! Scorer registry.
//!
//! Names are resolved to [`Scorer`] variants once, when the configuration
//! is parsed. Binary scorers treat encoded class 1 as the positive class.

use crate::core::{ClassIndex, Error, Result};
use indexmap::IndexMap;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scorer name → value for one evaluated entity.
pub type MetricRow = IndexMap<String, f64>;

/// Suffix accepted on top of a base scorer name.
const MACRO_SUFFIX: &str = "_macro";

/// Built-in classification metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    Accuracy,
    BalancedAccuracy,
    Precision,
    Recall,
    F1,
    PrecisionMacro,
    RecallMacro,
    F1Macro,
    /// TP / (TP + FN)
    Sensitivity,
    /// TN / (TN + FP)
    Specificity,
}

impl Scorer {
    /// Every built-in scorer.
    pub const ALL: [Scorer; 10] = [
        Scorer::Accuracy,
        Scorer::BalancedAccuracy,
        Scorer::Precision,
        Scorer::Recall,
        Scorer::F1,
        Scorer::PrecisionMacro,
        Scorer::RecallMacro,
        Scorer::F1Macro,
        Scorer::Sensitivity,
        Scorer::Specificity,
    ];

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Scorer::Accuracy => "accuracy",
            Scorer::BalancedAccuracy => "balanced_accuracy",
            Scorer::Precision => "precision",
            Scorer::Recall => "recall",
            Scorer::F1 => "f1",
            Scorer::PrecisionMacro => "precision_macro",
            Scorer::RecallMacro => "recall_macro",
            Scorer::F1Macro => "f1_macro",
            Scorer::Sensitivity => "sensitivity",
            Scorer::Specificity => "specificity",
        }
    }

    /// Resolve a declared name, falling back from `<base>_macro` to `<base>`.
    pub fn resolve(name: &str) -> Result<Self> {
        let exact = |candidate: &str| Self::ALL.iter().copied().find(|s| s.name() == candidate);

        exact(name)
            .or_else(|| name.strip_suffix(MACRO_SUFFIX).and_then(exact))
            .ok_or_else(|| Error::UnknownScorer(name.to_string()))
    }

    /// Score hard predictions against the truth.
    pub fn score(
        &self,
        y_true: ArrayView1<'_, ClassIndex>,
        y_pred: ArrayView1<'_, ClassIndex>,
    ) -> f64 {
        let matrix = ConfusionMatrix::new(y_true, y_pred);
        match self {
            Scorer::Accuracy => matrix.accuracy(),
            Scorer::BalancedAccuracy => matrix.balanced_accuracy(),
            Scorer::Precision => matrix.precision(1),
            Scorer::Recall | Scorer::Sensitivity => matrix.recall(1),
            Scorer::F1 => matrix.f1(1),
            Scorer::PrecisionMacro => matrix.macro_average(|m, c| m.precision(c)),
            Scorer::RecallMacro => matrix.macro_average(|m, c| m.recall(c)),
            Scorer::F1Macro => matrix.macro_average(|m, c| m.f1(c)),
            Scorer::Specificity => ratio(matrix.get(0, 0), matrix.get(0, 0) + matrix.get(0, 1)),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Counts indexed `[true][predicted]`.
#[derive(Clone, Debug)]
struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
    labels: BTreeSet<ClassIndex>,
    total: usize,
}

impl ConfusionMatrix {
    fn new(y_true: ArrayView1<'_, ClassIndex>, y_pred: ArrayView1<'_, ClassIndex>) -> Self {
        let labels: BTreeSet<ClassIndex> = y_true.iter().chain(y_pred.iter()).copied().collect();
        // binary scorers read cells (0, 0)..(1, 1) even if a class is absent
        let size = labels.iter().next_back().map_or(0, |&max| max + 1).max(2);
        let mut counts = vec![vec![0; size]; size];
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            counts[t][p] += 1;
        }
        Self {
            counts,
            labels,
            total: y_true.len().min(y_pred.len()),
        }
    }

    fn get(&self, truth: ClassIndex, predicted: ClassIndex) -> usize {
        self.counts[truth][predicted]
    }

    fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.counts.len()).map(|c| self.get(c, c)).sum();
        ratio(correct, self.total)
    }

    fn support(&self, class: ClassIndex) -> usize {
        self.counts[class].iter().sum()
    }

    fn predicted(&self, class: ClassIndex) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    fn precision(&self, class: ClassIndex) -> f64 {
        ratio(self.get(class, class), self.predicted(class))
    }

    fn recall(&self, class: ClassIndex) -> f64 {
        ratio(self.get(class, class), self.support(class))
    }

    fn f1(&self, class: ClassIndex) -> f64 {
        let tp = self.get(class, class);
        ratio(2 * tp, self.predicted(class) + self.support(class))
    }

    fn balanced_accuracy(&self) -> f64 {
        let present: Vec<ClassIndex> = self
            .labels
            .iter()
            .copied()
            .filter(|&c| self.support(c) > 0)
            .collect();
        if present.is_empty() {
            return 0.0;
        }
        present.iter().map(|&c| self.recall(c)).sum::<f64>() / present.len() as f64
    }

    fn macro_average(&self, metric: impl Fn(&Self, ClassIndex) -> f64) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().map(|&c| metric(self, c)).sum::<f64>() / self.labels.len() as f64
    }
}

/// Resolved scorers, keyed by the name they were declared under.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScorerSet {
    scorers: Vec<(String, Scorer)>,
}

impl ScorerSet {
    /// Resolve every declared name.
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let scorers = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                Scorer::resolve(name).map(|scorer| (name.to_string(), scorer))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { scorers })
    }

    /// Declared names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scorers.iter().map(|(name, _)| name.as_str())
    }

    /// Number of scorers.
    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    /// Whether no scorer is configured.
    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    /// Apply every scorer.
    pub fn evaluate(
        &self,
        y_true: ArrayView1<'_, ClassIndex>,
        y_pred: ArrayView1<'_, ClassIndex>,
    ) -> MetricRow {
        self.scorers
            .iter()
            .map(|(name, scorer)| (name.clone(), scorer.score(y_true, y_pred)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_resolve_names_and_macro_fallback() {
        assert_eq!(Scorer::resolve("f1_macro").unwrap(), Scorer::F1Macro);
        assert_eq!(Scorer::resolve("sensitivity_macro").unwrap(), Scorer::Sensitivity);
        assert!(matches!(
            Scorer::resolve("roc_auc"),
            Err(Error::UnknownScorer(_))
        ));
    }

    #[test]
    fn test_sensitivity_and_specificity() {
        // TP = 3, FN = 1, TN = 2, FP = 2
        let y_true = array![1, 1, 1, 1, 0, 0, 0, 0];
        let y_pred = array![1, 1, 1, 0, 0, 0, 1, 1];
        assert!((Scorer::Sensitivity.score(y_true.view(), y_pred.view()) - 0.75).abs() < 1e-12);
        assert!((Scorer::Specificity.score(y_true.view(), y_pred.view()) - 0.5).abs() < 1e-12);
        assert!((Scorer::Accuracy.score(y_true.view(), y_pred.view()) - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_macro_scores() {
        let y_true = array![0, 0, 1, 2];
        let y_pred = array![0, 1, 1, 2];
        // precision per class: 1, 0.5, 1
        let precision = Scorer::PrecisionMacro.score(y_true.view(), y_pred.view());
        assert!((precision - 2.5 / 3.0).abs() < 1e-12);
        // recall per class: 0.5, 1, 1
        let recall = Scorer::RecallMacro.score(y_true.view(), y_pred.view());
        assert!((recall - 2.5 / 3.0).abs() < 1e-12);
        let balanced = Scorer::BalancedAccuracy.score(y_true.view(), y_pred.view());
        assert!((balanced - recall).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_score_zero() {
        let y_true = array![0, 0];
        let y_pred = array![0, 0];
        assert_eq!(Scorer::Precision.score(y_true.view(), y_pred.view()), 0.0);
        assert_eq!(Scorer::Sensitivity.score(y_true.view(), y_pred.view()), 0.0);
        assert_eq!(Scorer::Specificity.score(y_true.view(), y_pred.view()), 1.0);
    }

    #[test]
    fn test_scorer_set_keeps_declared_names() {
        let set = ScorerSet::resolve(&["accuracy", "recall_macro", "specificity_macro"]).unwrap();
        let row = set.evaluate(array![0, 1].view(), array![0, 1].view());
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["accuracy", "recall_macro", "specificity_macro"]);
        assert!(ScorerSet::resolve(&["accuracy", "bogus"]).is_err());
    }
}
