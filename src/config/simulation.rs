//! Simulation parameters.

use crate::aggregation::{SocialChoiceRule, StatMethod};
use crate::classifier::ClassifierSpec;
use crate::core::{Error, Result};
use crate::data::{dataset_name, ClassColumn};
use crate::metrics::ScorerSet;
use crate::split::{FeatureDistributor, Overlap, StratifiedFoldSplitter, DEFAULT_FOLDS};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Plurality voter settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoterConfig {
    /// Entity name
    #[serde(default = "default_voter_name")]
    pub name: String,
    /// Learner names, most trusted first
    #[serde(default)]
    pub priority: Vec<String>,
}

impl Default for VoterConfig {
    fn default() -> Self {
        Self {
            name: default_voter_name(),
            priority: Vec::new(),
        }
    }
}

/// Stacking combiner settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombinerConfig {
    /// Entity name
    #[serde(default = "default_combiner_name")]
    pub name: String,
    /// Meta-classifier trained on validation probabilities
    #[serde(default = "ClassifierSpec::logistic_regression")]
    pub meta: ClassifierSpec,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            name: default_combiner_name(),
            meta: ClassifierSpec::logistic_regression(),
        }
    }
}

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Feature sharing between agents
    #[serde(default)]
    pub overlap: Overlap,
    /// Number of repetitions of the whole k-fold loop
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Folds per iteration
    #[serde(default = "default_folds")]
    pub folds: usize,
    /// Label column of raw records; see [`SimulationConfig::class_column_for`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_column: Option<ClassColumn>,
    /// Base seed; drawn from entropy when absent
    #[serde(default)]
    pub random_state: Option<u64>,
    /// Scorer names
    #[serde(default = "default_scorers")]
    pub scorers: Vec<String>,
    /// Agents by name, in agent order
    pub classifiers: IndexMap<String, ClassifierSpec>,
    #[serde(default)]
    pub voter: VoterConfig,
    #[serde(default)]
    pub combiner: CombinerConfig,
    /// Probability combination methods
    #[serde(default = "default_methods")]
    pub mathematician: Vec<StatMethod>,
    /// Social-choice rules
    #[serde(default = "default_rules")]
    pub arbiter: Vec<SocialChoiceRule>,
    /// Centralised classifier trained on every feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<ClassifierSpec>,
    /// Fit agents concurrently
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_voter_name() -> String {
    "voter".to_string()
}

fn default_combiner_name() -> String {
    "combiner".to_string()
}

fn default_iterations() -> usize {
    10
}

fn default_folds() -> usize {
    DEFAULT_FOLDS
}

fn default_scorers() -> Vec<String> {
    vec!["accuracy".to_string()]
}

fn default_methods() -> Vec<StatMethod> {
    vec![StatMethod::Mean, StatMethod::Median]
}

fn default_rules() -> Vec<SocialChoiceRule> {
    SocialChoiceRule::ALL.to_vec()
}

fn default_parallel() -> bool {
    true
}

const BINARY_SCORERS: [&str; 6] = [
    "accuracy",
    "precision",
    "recall",
    "f1",
    "sensitivity",
    "specificity",
];

const MULTICLASS_SCORERS: [&str; 5] = [
    "accuracy",
    "balanced_accuracy",
    "precision_macro",
    "recall_macro",
    "f1_macro",
];

/// Entity names become result file names.
fn check_entity_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidConfig(format!(
            "entity name {:?} cannot be used as a file name",
            name
        )));
    }
    Ok(())
}

impl SimulationConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidConfig(err.to_string()))
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stock parameters for a binary or multiclass problem.
    pub fn defaults_for(n_classes: usize) -> Self {
        let scorers: &[&str] = if n_classes == 2 {
            &BINARY_SCORERS
        } else {
            &MULTICLASS_SCORERS
        };
        let mut classifiers = IndexMap::new();
        classifiers.insert("gaussian_nb".to_string(), ClassifierSpec::gaussian_nb());
        classifiers.insert("knn".to_string(), ClassifierSpec::knn(5));
        classifiers.insert(
            "logistic_regression".to_string(),
            ClassifierSpec::logistic_regression(),
        );

        Self {
            overlap: Overlap::default(),
            iterations: default_iterations(),
            folds: default_folds(),
            class_column: None,
            random_state: None,
            scorers: scorers.iter().map(|s| s.to_string()).collect(),
            classifiers,
            voter: VoterConfig::default(),
            combiner: CombinerConfig::default(),
            mathematician: default_methods(),
            arbiter: default_rules(),
            baseline: None,
            parallel: default_parallel(),
        }
    }

    /// Number of agents.
    pub fn n_agents(&self) -> usize {
        self.classifiers.len()
    }

    /// Learner names in agent order.
    pub fn learner_names(&self) -> impl Iterator<Item = &str> {
        self.classifiers.keys().map(String::as_str)
    }

    /// Label column for `dataset`: the configured one, else resolved from
    /// the dataset's file name (`…_first` / `…_last`).
    pub fn class_column_for(&self, dataset: &str) -> Result<ClassColumn> {
        match self.class_column {
            Some(column) => Ok(column),
            None => ClassColumn::from_dataset_name(&dataset_name(dataset)),
        }
    }

    /// Check everything that does not depend on the dataset.
    pub fn validate(&self) -> Result<()> {
        if self.classifiers.is_empty() {
            return Err(Error::EmptyClassifierList);
        }
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be at least 1".to_string()));
        }
        StratifiedFoldSplitter::new(self.folds)?;
        ScorerSet::resolve(&self.scorers)?;

        for spec in self.classifiers.values() {
            spec.validate()?;
        }
        self.combiner.meta.validate()?;
        if let Some(baseline) = &self.baseline {
            baseline.validate()?;
        }

        for name in self
            .learner_names()
            .chain([self.voter.name.as_str(), self.combiner.name.as_str()])
        {
            check_entity_name(name)?;
        }

        if let Some(unknown) = self
            .voter
            .priority
            .iter()
            .find(|name| !self.classifiers.contains_key(name.as_str()))
        {
            return Err(Error::UnknownLearner(unknown.clone()));
        }

        if let Overlap::Fraction(_) = self.overlap {
            // fraction bounds do not depend on the feature count
            self.overlap.core_size(0, self.n_agents())?;
        }
        Ok(())
    }

    /// Check the overlap against the dataset's width.
    pub fn validate_for(&self, n_features: usize) -> Result<()> {
        self.validate()?;
        FeatureDistributor::new(self.n_agents(), self.overlap.clone()).validate(n_features)?;
        Ok(())
    }
}
