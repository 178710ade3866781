//! Dataset model
//!
//! The immutable feature matrix shared by all agents, plus the loader
//! conventions the simulator relies on:
//! - Class column resolution from dataset names
//! - Record splitting and label encoding

pub mod dataset;

pub use dataset::{dataset_name, ClassColumn, Dataset};
