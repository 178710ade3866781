//! Tracing subscriber setup.

use crate::core::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, or `default_directive`
/// when the variable is unset.
///
/// Returns `false` when a global subscriber was already installed, so
/// calling this more than once is harmless.
///
/// ```no_run
/// featdist::telemetry::init_tracing("featdist=info").unwrap();
/// ```
pub fn init_tracing(default_directive: &str) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|err| {
            Error::InvalidConfig(format!("log filter {}: {}", default_directive, err))
        })?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("featdist=debug").unwrap();
        assert!(!init_tracing("featdist=debug").unwrap());
    }
}
