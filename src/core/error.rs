//! Error types for featdist.

use thiserror::Error;

/// Result type alias for featdist operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Could not resolve class column from dataset name: {0}")]
    UnresolvableClassColumn(String),

    #[error("Invalid overlap: {0}")]
    InvalidOverlap(String),

    #[error("No classifiers configured")]
    EmptyClassifierList,

    #[error("Unknown scorer: {0}")]
    UnknownScorer(String),

    #[error("Unknown learner in voter priority: {0}")]
    UnknownLearner(String),

    #[error("Invalid fold count {folds}: {reason}")]
    InvalidFolds { folds: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Data errors
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    // Fit errors
    #[error("Degenerate training data: {0}")]
    DegenerateTrainingData(String),

    #[error("Learner {learner} failed to fit: {reason}")]
    FitFailed { learner: String, reason: String },

    // Lifecycle errors
    #[error("Learner {learner} is {found}, expected {expected}")]
    InvalidState {
        learner: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Classifier used before fit")]
    NotFitted,

    // Fatal errors
    #[error("Fit worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Result directory already exists: {0}")]
    ResultExists(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error must abort the run before any fold executes.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::UnresolvableClassColumn(_)
                | Error::InvalidOverlap(_)
                | Error::EmptyClassifierList
                | Error::UnknownScorer(_)
                | Error::UnknownLearner(_)
                | Error::InvalidFolds { .. }
                | Error::InvalidConfig(_)
        )
    }

    /// Whether this error is a fold-local fit failure.
    pub fn is_fit(&self) -> bool {
        matches!(
            self,
            Error::DegenerateTrainingData(_) | Error::FitFailed { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
