//! Simulation driver.
//!
//! Repeats a stratified k-fold loop `iterations` times. Every iteration
//! draws fresh feature partitions and folds from `seed + iteration`; every
//! fold fits all agents behind the scheduler's barrier, evaluates them,
//! feeds their outputs to each aggregator and accumulates the scores.

use crate::agents::{ConcurrentFitScheduler, Learner, ScheduleMode};
use crate::aggregation::{AggregationContext, AggregatorRegistry};
use crate::config::SimulationConfig;
use crate::core::{now, Error, Result};
use crate::data::Dataset;
use crate::metrics::{ScoreAccumulator, ScorerSet};
use crate::simulator::report::{FailedFold, RankTable, SimulationReport};
use crate::split::{FeatureDistributor, Fold, StratifiedFoldSplitter};
use indexmap::IndexMap;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Entity name of the centralised classifier.
pub const BASELINE_ENTITY: &str = "baseline";

#[derive(Default)]
struct RunState {
    scores: ScoreAccumulator,
    ranks: IndexMap<String, RankTable>,
    failed_folds: Vec<FailedFold>,
}

impl RunState {
    fn fail(&mut self, iteration: usize, fold: usize, entity: Option<&str>, err: &Error) {
        warn!(iteration, fold, entity = entity.unwrap_or("*"), error = %err, "fold skipped");
        self.failed_folds.push(FailedFold {
            iteration,
            fold,
            entity: entity.map(str::to_string),
            reason: err.to_string(),
        });
    }
}

/// Feature-distributed classification simulator.
pub struct FeatureDistributedSimulator {
    dataset: Arc<Dataset>,
    config: SimulationConfig,
    learners: Vec<Learner>,
    learner_names: Vec<String>,
    class_names: Vec<String>,
    baseline: Option<Learner>,
    scorers: ScorerSet,
    registry: AggregatorRegistry,
    distributor: FeatureDistributor,
    splitter: StratifiedFoldSplitter,
    scheduler: ConcurrentFitScheduler,
}

impl FeatureDistributedSimulator {
    /// Validate `config` against `dataset` and build every component.
    ///
    /// All configuration errors surface here, before any fold runs.
    pub fn new(dataset: impl Into<Arc<Dataset>>, config: SimulationConfig) -> Result<Self> {
        let dataset = dataset.into();
        config.validate_for(dataset.n_features())?;

        let scorers = ScorerSet::resolve(&config.scorers)?;
        let registry = AggregatorRegistry::from_config(&config)?;
        let learner_names: Vec<String> = config.classifiers.keys().cloned().collect();

        let mut entities: Vec<&str> = learner_names.iter().map(String::as_str).collect();
        entities.extend(registry.names());
        if config.baseline.is_some() {
            entities.push(BASELINE_ENTITY);
        }
        for (idx, entity) in entities.iter().enumerate() {
            if entities[..idx].contains(entity) {
                return Err(Error::InvalidConfig(format!(
                    "entity name used twice: {}",
                    entity
                )));
            }
        }

        let learners = config
            .classifiers
            .iter()
            .map(|(name, spec)| Learner::new(name, spec.build()))
            .collect();
        let baseline = config
            .baseline
            .as_ref()
            .map(|spec| Learner::new(BASELINE_ENTITY, spec.build()));
        let mode = if config.parallel {
            ScheduleMode::Concurrent
        } else {
            ScheduleMode::Sequential
        };

        Ok(Self {
            class_names: (0..dataset.n_classes())
                .map(|class| dataset.label_name(class))
                .collect(),
            distributor: FeatureDistributor::new(config.n_agents(), config.overlap.clone()),
            splitter: StratifiedFoldSplitter::new(config.folds)?,
            scheduler: ConcurrentFitScheduler::new(mode),
            dataset,
            config,
            learners,
            learner_names,
            baseline,
            scorers,
            registry,
        })
    }

    /// Parameters of this simulator.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared dataset.
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Aggregator entity names in evaluation order.
    pub fn aggregators(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Run every iteration and fold.
    pub async fn evaluate(&mut self) -> Result<SimulationReport> {
        let run_id = Uuid::new_v4();
        let started_at = now();
        let seed = match self.config.random_state {
            Some(seed) => seed,
            None => rand::thread_rng().gen(),
        };
        info!(
            %run_id,
            seed,
            agents = self.learners.len(),
            aggregators = self.registry.len(),
            iterations = self.config.iterations,
            folds = self.config.folds,
            "simulation started"
        );

        let mut state = RunState::default();
        for name in self.registry.names() {
            state.ranks.insert(name.to_string(), RankTable::new(name));
        }

        for iteration in 0..self.config.iterations {
            let iteration_seed = seed.wrapping_add(iteration as u64);
            self.bind_iteration(iteration_seed)?;

            for fold in self.splitter.split(self.dataset.y(), iteration_seed)? {
                let span = info_span!("fold", iteration, fold = fold.index);
                self.run_fold(iteration, &fold, &mut state)
                    .instrument(span)
                    .await?;
            }
        }

        let report = SimulationReport {
            run_id,
            started_at,
            finished_at: now(),
            seed,
            scores: state.scores,
            ranks: state.ranks,
            failed_folds: state.failed_folds,
        };

        let summary = report.summary();
        for (entity, means) in &summary.means {
            info!(entity = %entity, columns = ?summary.columns, means = ?means, "entity summary");
        }
        info!(
            %run_id,
            failed_folds = report.failed_folds.len(),
            "simulation finished"
        );
        Ok(report)
    }

    fn bind_iteration(&mut self, seed: u64) -> Result<()> {
        let n_features = self.dataset.n_features();
        let partitions = self.distributor.split(n_features, seed)?;
        for (learner, features) in self.learners.iter_mut().zip(partitions) {
            debug!(learner = learner.name(), features = ?features, "partition bound");
            learner.bind(Arc::clone(&self.dataset), features);
        }
        if let Some(baseline) = &mut self.baseline {
            baseline.bind(Arc::clone(&self.dataset), (0..n_features).collect());
        }
        Ok(())
    }

    async fn run_fold(
        &mut self,
        iteration: usize,
        fold: &Fold,
        state: &mut RunState,
    ) -> Result<()> {
        match self.scheduler.fit_all(&mut self.learners, fold.train.clone()).await {
            Ok(()) => {}
            Err(err) if err.is_fit() => {
                state.fail(iteration, fold.index, None, &err);
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        let n_agents = self.learners.len();
        let mut predictions = Vec::with_capacity(n_agents);
        let mut test_probas = Vec::with_capacity(n_agents);
        let mut validation_probas = Vec::with_capacity(n_agents);
        for learner in &mut self.learners {
            let evaluation = learner.evaluate(fold, &self.scorers)?;
            debug!(
                learner = learner.name(),
                fit_time = evaluation.metrics.get("fit_time").copied().unwrap_or_default(),
                score_time = evaluation.metrics.get("score_time").copied().unwrap_or_default(),
                "learner evaluated"
            );
            state
                .scores
                .append(learner.name(), iteration, fold.index, &evaluation.metrics);
            predictions.push(evaluation.y_pred);
            test_probas.push(evaluation.proba_test);
            validation_probas.push(evaluation.proba_validation);
        }

        let y_true = self.dataset.targets(&fold.test);
        let validation_labels = self.dataset.targets(&fold.validation);
        let ctx = AggregationContext {
            y_true: y_true.view(),
            predictions: &predictions,
            test_probas: &test_probas,
            validation_probas: &validation_probas,
            validation_labels: validation_labels.view(),
            learners: &self.learner_names,
            test_indices: &fold.test,
            class_names: &self.class_names,
            scorers: &self.scorers,
        };

        for aggregator in self.registry.iter() {
            match aggregator.aggregate(&ctx) {
                Ok(result) => {
                    state
                        .scores
                        .append(&result.entity, iteration, fold.index, &result.scores);
                    state
                        .ranks
                        .entry(result.entity.clone())
                        .or_insert_with(|| RankTable::new(&result.entity))
                        .push(iteration, fold.index, result.ranking);
                }
                Err(err) if err.is_fit() => {
                    state.fail(iteration, fold.index, Some(aggregator.name()), &err)
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(baseline) = &mut self.baseline {
            let outcome = match baseline.fit_rows(&fold.train) {
                Ok(()) => baseline.evaluate(fold, &self.scorers),
                Err(err) => Err(err),
            };
            match outcome {
                Ok(evaluation) => {
                    state
                        .scores
                        .append(BASELINE_ENTITY, iteration, fold.index, &evaluation.metrics)
                }
                Err(err) if err.is_fit() => {
                    state.fail(iteration, fold.index, Some(BASELINE_ENTITY), &err)
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FeatureDistributedSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDistributedSimulator")
            .field("learners", &self.learner_names)
            .field("aggregators", &self.registry)
            .field("baseline", &self.baseline.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierSpec;
    use crate::split::Overlap;
    use crate::testing::{blobs, Panicking};
    use ndarray::Array2;

    fn config(parallel: bool) -> SimulationConfig {
        let mut config = SimulationConfig::defaults_for(3);
        config.iterations = 2;
        config.folds = 3;
        config.random_state = Some(11);
        config.parallel = parallel;
        config.overlap = Overlap::Fraction(0.5);
        config
    }

    #[tokio::test]
    async fn test_every_entity_is_scored_every_fold() {
        let mut config = config(true);
        config.baseline = Some(ClassifierSpec::gaussian_nb());
        let mut simulator = FeatureDistributedSimulator::new(blobs(12, 3, 9, 5), config).unwrap();
        let report = simulator.evaluate().await.unwrap();

        assert_eq!(report.seed, 11);
        assert!(report.failed_folds.is_empty());
        let entities: Vec<&str> = report.scores.entities().collect();
        assert_eq!(
            entities,
            vec![
                "gaussian_nb",
                "knn",
                "logistic_regression",
                "voter",
                "combiner",
                "borda",
                "dowdall",
                "copeland",
                "simpson",
                "mean",
                "median",
                "baseline",
            ]
        );
        for matrix in report.scores.matrices() {
            assert_eq!(matrix.len(), 6, "{}", matrix.entity);
            assert!(!matrix.columns.contains(&"fit_time".to_string()));
        }
        assert_eq!(report.ranks["borda"].rows.len(), 6);
        assert!(report.summary().get("voter", "accuracy").unwrap() > 0.8);
    }

    #[tokio::test]
    async fn test_fixed_seed_is_reproducible_across_schedules() {
        let dataset = Arc::new(blobs(10, 2, 6, 9));
        let mut sequential =
            FeatureDistributedSimulator::new(Arc::clone(&dataset), config(false)).unwrap();
        let mut concurrent = FeatureDistributedSimulator::new(dataset, config(true)).unwrap();

        let a = sequential.evaluate().await.unwrap();
        let b = concurrent.evaluate().await.unwrap();
        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.ranks, b.ranks);
    }

    #[tokio::test]
    async fn test_failed_folds_do_not_abort_the_run() {
        // a single minority row: folds that miss it in training cannot fit
        let rows = 13;
        let x = Array2::from_shape_fn((rows, 4), |(row, col)| (row * 4 + col) as f64);
        let labels: Vec<f64> = (0..rows).map(|row| if row == 12 { 1.0 } else { 0.0 }).collect();
        let dataset = Dataset::new(x, &labels).unwrap();

        let mut config = config(true);
        config.iterations = 1;
        config.overlap = Overlap::Count(0);
        config.classifiers.clear();
        config.classifiers.insert("near".to_string(), ClassifierSpec::knn(1));
        config.classifiers.insert("far".to_string(), ClassifierSpec::knn(3));

        let mut simulator = FeatureDistributedSimulator::new(dataset, config).unwrap();
        let report = simulator.evaluate().await.unwrap();

        let whole_folds = report.failed_folds.iter().filter(|f| f.entity.is_none()).count();
        assert_eq!(whole_folds, 2);
        assert!(report
            .failed_folds
            .iter()
            .any(|f| f.entity.as_deref() == Some("combiner")));
        assert_eq!(report.scores.matrix("near").unwrap().len(), 1);
        assert!(report.scores.matrix("combiner").is_none());
    }

    #[tokio::test]
    async fn test_generated_records_run_with_defaults() {
        let records: Vec<Vec<f64>> = (0..60)
            .map(|i| {
                let class = (i % 2) as f64;
                let mut row = vec![class];
                row.extend((0..6).map(|j| class * 2.0 + ((i * 7 + j * 3) % 5) as f64 * 0.1));
                row
            })
            .collect();

        let mut config = SimulationConfig::defaults_for(2);
        config.folds = 5;
        let column = config.class_column_for("toy_first.csv").unwrap();
        let dataset = Dataset::from_records(&records, column).unwrap();
        let mut simulator = FeatureDistributedSimulator::new(dataset, config).unwrap();
        let report = simulator.evaluate().await.unwrap();

        assert!(report.failed_folds.is_empty());
        assert_eq!(report.scores.matrix("voter").unwrap().len(), 50);
        assert!(report.summary().get("voter", "accuracy").unwrap() > 0.95);
    }

    #[tokio::test]
    async fn test_worker_panic_aborts_the_run() {
        let mut simulator =
            FeatureDistributedSimulator::new(blobs(10, 3, 9, 3), config(true)).unwrap();
        simulator.learners[0] = Learner::new("gaussian_nb", Box::new(Panicking));

        let err = simulator.evaluate().await.unwrap_err();
        assert!(matches!(err, Error::WorkerPanicked(_)));
        assert!(!err.is_fit());
    }

    #[test]
    fn test_configuration_errors_surface_in_new() {
        let mut config = config(true);
        config.overlap = Overlap::Count(20);
        let err = FeatureDistributedSimulator::new(blobs(5, 2, 4, 0), config).unwrap_err();
        assert!(err.is_config());

        let mut config = self::config(true);
        config.classifiers.insert("borda".to_string(), ClassifierSpec::knn(1));
        let err = FeatureDistributedSimulator::new(blobs(5, 2, 8, 0), config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
