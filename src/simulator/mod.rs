//! Simulation
//!
//! Drives the full experiment and stores its results:
//! - Iteration and fold loop over agents and aggregators
//! - Run reports with scores, rankings and failed folds
//! - JSON result directories

pub mod engine;
pub mod report;
pub mod sink;

pub use engine::{FeatureDistributedSimulator, BASELINE_ENTITY};
pub use report::{FailedFold, RankRow, RankTable, SimulationReport};
pub use sink::{JsonDirectorySink, ResultSink};
