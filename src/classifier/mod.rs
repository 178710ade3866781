//! Local classifiers
//!
//! The model contract agents train behind, and the built-in families:
//! - Gaussian naive Bayes
//! - k nearest neighbours
//! - Multinomial logistic regression (default stacking meta-model)

pub mod interface;
pub mod knn;
pub mod logistic;
pub mod naive_bayes;

pub use interface::{proba_to_labels, Classifier, ClassifierSpec};
pub use knn::KNearest;
pub use logistic::LogisticRegression;
pub use naive_bayes::GaussianNb;
