//! Scoring
//!
//! Provides the metrics every entity is compared on:
//! - Scorer registry resolved from configured names
//! - Append-only per-entity score matrices
//! - Column-aligned summaries across entities

pub mod accumulator;
pub mod scorer;

pub use accumulator::{
    summary, ScoreAccumulator, ScoreMatrix, ScoreRow, Summary, RESERVED_TIMING_KEYS,
};
pub use scorer::{MetricRow, Scorer, ScorerSet};
