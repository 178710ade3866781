//! Stratified three-way k-fold splitting.
//!
//! Every fold is a train/validation/test triple. The test slice is one
//! stratified block, the validation slice is the next block (so it is
//! carved out of what would otherwise be the training partition), and the
//! training slice holds the remaining `k - 2` blocks.

use crate::core::{seeded_rng, ClassIndex, Error, Result};
use ndarray::ArrayView1;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Default number of folds.
pub const DEFAULT_FOLDS: usize = 10;

/// Row indices of one cross-validation round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    /// Fold position within its split
    pub index: usize,
    /// Rows used to fit the agents
    pub train: Arc<[usize]>,
    /// Rows used to fit the combiner
    pub validation: Vec<usize>,
    /// Held-out rows that are scored
    pub test: Vec<usize>,
}

/// Class-balance-preserving k-fold splitter with a validation slice.
#[derive(Clone, Debug)]
pub struct StratifiedFoldSplitter {
    n_folds: usize,
}

impl Default for StratifiedFoldSplitter {
    fn default() -> Self {
        Self {
            n_folds: DEFAULT_FOLDS,
        }
    }
}

impl StratifiedFoldSplitter {
    /// Create a splitter producing `n_folds` folds (at least 3).
    pub fn new(n_folds: usize) -> Result<Self> {
        if n_folds < 3 {
            return Err(Error::InvalidFolds {
                folds: n_folds,
                reason: "a train/validation/test split needs at least 3 folds".to_string(),
            });
        }
        Ok(Self { n_folds })
    }

    /// Number of folds per split.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Assign every row to a fold and return the lazy fold sequence.
    pub fn split(&self, y: ArrayView1<'_, ClassIndex>, seed: u64) -> Result<Folds> {
        if y.len() < self.n_folds {
            return Err(Error::InvalidFolds {
                folds: self.n_folds,
                reason: format!("only {} instances available", y.len()),
            });
        }

        let n_classes = y.iter().max().map_or(0, |&max| max + 1);
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (row, &class) in y.iter().enumerate() {
            by_class[class].push(row);
        }

        let mut rng = seeded_rng(seed);
        let mut blocks: Vec<Vec<usize>> = vec![Vec::new(); self.n_folds];
        let mut position = 0;
        for rows in &mut by_class {
            rows.shuffle(&mut rng);
            for &row in rows.iter() {
                blocks[position % self.n_folds].push(row);
                position += 1;
            }
        }
        for block in &mut blocks {
            block.sort_unstable();
        }

        Ok(Folds { blocks, next: 0 })
    }
}

/// Folds of one split, produced on demand.
#[derive(Clone, Debug)]
pub struct Folds {
    blocks: Vec<Vec<usize>>,
    next: usize,
}

impl Iterator for Folds {
    type Item = Fold;

    fn next(&mut self) -> Option<Fold> {
        let k = self.blocks.len();
        if self.next >= k {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let validation_block = (index + 1) % k;
        let mut train: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(block, _)| *block != index && *block != validation_block)
            .flat_map(|(_, rows)| rows.iter().copied())
            .collect();
        train.sort_unstable();

        Some(Fold {
            index,
            train: train.into(),
            validation: self.blocks[validation_block].clone(),
            test: self.blocks[index].clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.blocks.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Folds {}
