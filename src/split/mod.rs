//! Data splitting
//!
//! The two seeded splits every iteration starts from:
//! - Vertical: feature columns distributed across agents
//! - Horizontal: stratified train/validation/test folds over instances

pub mod distributor;
pub mod stratified;

pub use distributor::{FeatureDistributor, Overlap};
pub use stratified::{Fold, Folds, StratifiedFoldSplitter, DEFAULT_FOLDS};
