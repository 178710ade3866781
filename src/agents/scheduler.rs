//! Fold-synchronised fitting of all learners.
//!
//! Each worker owns its learner for the duration of the fit and only reads
//! the shared dataset, so no locks are involved. The join over every
//! handle is the barrier: no learner is handed back, and no evaluation can
//! start, before all fits of the fold have finished.

use crate::agents::learner::Learner;
use crate::core::{Error, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How the fits of one fold are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// One blocking worker per learner
    #[default]
    Concurrent,
    /// Inline, in learner order
    Sequential,
}

/// Runs every learner's fit for a fold and waits for all of them.
#[derive(Clone, Debug, Default)]
pub struct ConcurrentFitScheduler {
    mode: ScheduleMode,
}

impl ConcurrentFitScheduler {
    /// Create a scheduler.
    pub fn new(mode: ScheduleMode) -> Self {
        Self { mode }
    }

    /// Execution mode.
    pub fn mode(&self) -> ScheduleMode {
        self.mode
    }

    /// Fit every learner on `train` rows.
    ///
    /// All workers are awaited even when one fails; the returned error is
    /// the first failure in learner order. Learners come back in their
    /// original order. A panicking worker takes its learner with it and is
    /// reported as [`Error::WorkerPanicked`].
    pub async fn fit_all(&self, learners: &mut Vec<Learner>, train: Arc<[usize]>) -> Result<()> {
        match self.mode {
            ScheduleMode::Sequential => {
                let mut first_failure = None;
                for learner in learners.iter_mut() {
                    if let Err(err) = learner.fit_rows(&train) {
                        first_failure.get_or_insert(err);
                    }
                }
                first_failure.map_or(Ok(()), Err)
            }
            ScheduleMode::Concurrent => self.fit_concurrently(learners, train).await,
        }
    }

    async fn fit_concurrently(
        &self,
        learners: &mut Vec<Learner>,
        train: Arc<[usize]>,
    ) -> Result<()> {
        let handles: Vec<_> = learners
            .drain(..)
            .map(|mut learner| {
                let rows = Arc::clone(&train);
                tokio::task::spawn_blocking(move || {
                    let outcome = learner.fit_rows(&rows);
                    (learner, outcome)
                })
            })
            .collect();
        debug!(workers = handles.len(), rows = train.len(), "fit workers started");

        let mut first_failure = None;
        let mut panicked = None;
        for joined in join_all(handles).await {
            match joined {
                Ok((learner, outcome)) => {
                    if let Err(err) = outcome {
                        first_failure.get_or_insert(err);
                    }
                    learners.push(learner);
                }
                Err(join_error) => {
                    panicked.get_or_insert(join_error.to_string());
                }
            }
        }

        // a lost learner cannot be rebound, so it outranks ordinary fit errors
        if let Some(reason) = panicked {
            return Err(Error::WorkerPanicked(reason));
        }
        first_failure.map_or(Ok(()), Err)
    }
}
