//! Common types used across featdist modules.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Encoded class position in `0..n_classes`.
pub type ClassIndex = usize;

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Build the seeded RNG used by the distributor, splitter and combiners.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Index of the largest value, ties resolved to the lowest index.
///
/// NaN values never win. Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (idx, &value) in values.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}
