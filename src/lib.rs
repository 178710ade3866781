//! # featdist - Feature-Distributed Classification Simulator
//!
//! Simulates agents that each see a vertical slice of one dataset and
//! compares strategies for fusing their predictions:
//! - **Split**: overlapping feature partitions and stratified folds
//! - **Agents**: local classifiers fitted concurrently behind a barrier
//! - **Aggregation**: voting, stacking, mean/median and social-choice arbiters
//! - **Metrics**: per-entity score matrices and summaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use featdist::config::SimulationConfig;
//! use featdist::data::Dataset;
//! use featdist::simulator::{FeatureDistributedSimulator, JsonDirectorySink, ResultSink};
//!
//! #[tokio::main]
//! async fn main() -> featdist::Result<()> {
//!     featdist::telemetry::init_tracing("featdist=info")?;
//!
//!     // 60 rows, label first, six features drifting with the class
//!     let records: Vec<Vec<f64>> = (0..60)
//!         .map(|i| {
//!             let class = (i % 2) as f64;
//!             let mut row = vec![class];
//!             row.extend((0..6).map(|j| class * 2.0 + ((i * 7 + j * 3) % 5) as f64 * 0.1));
//!             row
//!         })
//!         .collect();
//!
//!     let mut config = SimulationConfig::defaults_for(2);
//!     config.folds = 5;
//!     let dataset = Dataset::from_records(&records, config.class_column_for("toy_first.csv")?)?;
//!
//!     let mut simulator = FeatureDistributedSimulator::new(dataset, config.clone())?;
//!     let report = simulator.evaluate().await?;
//!
//!     let sink = JsonDirectorySink::for_run("results", "toy_first.csv", &config.overlap)?;
//!     sink.persist(&report, &config)?;
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod aggregation;
pub mod classifier;
pub mod config;
pub mod core;
pub mod data;
pub mod metrics;
pub mod simulator;
pub mod split;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use core::error::{Error, Result};
