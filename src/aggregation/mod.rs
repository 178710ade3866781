//! Aggregation engine
//!
//! Fuses the agents' per-fold outputs into consensus predictions:
//! - Plurality voting with priority tie-break
//! - Stacking with a meta-classifier
//! - Mean / median probability combination
//! - Social-choice arbiters (Borda, Dowdall, Copeland, Simpson)

pub mod arbiter;
pub mod combiner;
pub mod mathematician;
pub mod registry;
pub mod strategy;
pub mod voter;

pub use arbiter::{pairwise_support, preference_order, Arbiter, SocialChoiceRule};
pub use combiner::Combiner;
pub use mathematician::{Mathematician, StatMethod};
pub use registry::AggregatorRegistry;
pub use strategy::{AggregationContext, AggregationResult, Aggregator, RankEntry, Ranking};
pub use voter::Voter;
