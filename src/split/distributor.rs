//! Vertical partitioning of the feature set across agents.

use crate::core::{seeded_rng, Error, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Degree of feature sharing between partitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Overlap {
    /// Absolute number of shared columns
    Count(u64),
    /// Fraction of a partition's size shared with every other partition
    Fraction(f64),
    /// Explicit shared columns
    Indices(Vec<usize>),
}

impl Default for Overlap {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl Overlap {
    /// Number of shared columns for the given layout.
    pub fn core_size(&self, n_features: usize, n_agents: usize) -> Result<usize> {
        match self {
            Self::Fraction(f) if !f.is_finite() || *f < 0.0 || *f > 1.0 => Err(
                Error::InvalidOverlap(format!("fraction {} is outside [0, 1]", f)),
            ),
            Self::Fraction(f) => {
                let partition = n_features as f64 / n_agents.max(1) as f64;
                Ok((f * partition).round() as usize)
            }
            Self::Count(c) if *c as usize > n_features => Err(Error::InvalidOverlap(format!(
                "{} shared columns exceed {} features",
                c, n_features
            ))),
            Self::Count(c) => Ok(*c as usize),
            Self::Indices(indices) => {
                let mut sorted = indices.clone();
                sorted.sort_unstable();
                sorted.dedup();
                if sorted.len() != indices.len() {
                    return Err(Error::InvalidOverlap(
                        "shared column list contains duplicates".to_string(),
                    ));
                }
                if let Some(bad) = sorted.iter().find(|&&idx| idx >= n_features) {
                    return Err(Error::InvalidOverlap(format!(
                        "shared column {} is out of range for {} features",
                        bad, n_features
                    )));
                }
                Ok(indices.len())
            }
        }
    }

    /// This overlap as a value for result directory names (fraction × 10).
    pub fn tag(&self) -> String {
        match self {
            Self::Fraction(f) => format!("{}", (f * 10.0) as i64),
            Self::Count(c) => format!("c{}", c),
            Self::Indices(indices) => format!("i{}", indices.len()),
        }
    }
}

/// Splits feature indices into one possibly-overlapping subset per agent.
#[derive(Clone, Debug)]
pub struct FeatureDistributor {
    n_agents: usize,
    overlap: Overlap,
}

impl FeatureDistributor {
    /// Create a distributor for `n_agents` partitions.
    pub fn new(n_agents: usize, overlap: Overlap) -> Self {
        Self { n_agents, overlap }
    }

    /// Check the overlap against a feature count without drawing anything.
    pub fn validate(&self, n_features: usize) -> Result<usize> {
        if self.n_agents == 0 {
            return Err(Error::EmptyClassifierList);
        }
        let core = self.overlap.core_size(n_features, self.n_agents)?;
        if n_features < self.n_agents + core {
            return Err(Error::InvalidOverlap(format!(
                "{} features cannot give {} agents a private column next to {} shared ones",
                n_features, self.n_agents, core
            )));
        }
        Ok(core)
    }

    /// Draw the partitions. Identical `(overlap, seed)` yields identical output.
    pub fn split(&self, n_features: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
        let core_size = self.validate(n_features)?;
        let mut rng = seeded_rng(seed);

        let mut pool: Vec<usize> = (0..n_features).collect();
        let mut core = match &self.overlap {
            Overlap::Indices(indices) => indices.clone(),
            _ => {
                pool.shuffle(&mut rng);
                pool[..core_size].to_vec()
            }
        };
        core.sort_unstable();
        pool.retain(|idx| core.binary_search(idx).is_err());
        pool.sort_unstable();
        pool.shuffle(&mut rng);

        let mut private: Vec<Vec<usize>> = vec![Vec::new(); self.n_agents];
        for (position, column) in pool.into_iter().enumerate() {
            private[position % self.n_agents].push(column);
        }

        Ok(private
            .into_iter()
            .map(|mut own| {
                own.sort_unstable();
                let mut partition = core.clone();
                partition.extend(own);
                partition
            })
            .collect())
    }

    /// Number of partitions produced.
    pub fn n_agents(&self) -> usize {
        self.n_agents
    }
}
