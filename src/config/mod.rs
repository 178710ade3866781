//! Configuration
//!
//! JSON-backed simulation parameters:
//! - Agents, scorers and aggregation strategies
//! - Binary and multiclass defaults
//! - Fail-fast validation

pub mod simulation;

pub use simulation::{CombinerConfig, SimulationConfig, VoterConfig};
