//! Persistence of simulation results.

use crate::config::SimulationConfig;
use crate::core::{Error, Result};
use crate::data::dataset_name;
use crate::simulator::report::SimulationReport;
use crate::split::Overlap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination of a finished run.
pub trait ResultSink {
    /// Store the report together with the parameters that produced it.
    fn persist(&self, report: &SimulationReport, config: &SimulationConfig) -> Result<()>;
}

/// Writes one JSON file per artefact into a directory.
///
/// Layout: `params.json`, `<entity>.scores.json` per scored entity,
/// `<entity>.ranks.json` per ranking entity, `summary.json`.
#[derive(Clone, Debug)]
pub struct JsonDirectorySink {
    dir: PathBuf,
}

impl JsonDirectorySink {
    /// Sink writing into an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create `<base>/<dataset stem>_<overlap tag>` for a fresh run.
    ///
    /// Refuses to reuse a directory left by an earlier run.
    pub fn for_run(base: impl AsRef<Path>, dataset: &str, overlap: &Overlap) -> Result<Self> {
        let name = dataset_name(dataset);
        let stem = Path::new(&name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(name);
        let dir = base.as_ref().join(format!("{}_{}", stem, overlap.tag()));

        if dir.exists() {
            return Err(Error::ResultExists(dir.display().to_string()));
        }
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(self.dir.join(file), json)?;
        Ok(())
    }
}

impl ResultSink for JsonDirectorySink {
    fn persist(&self, report: &SimulationReport, config: &SimulationConfig) -> Result<()> {
        self.write_json("params.json", config)?;
        for matrix in report.scores.matrices() {
            self.write_json(&format!("{}.scores.json", matrix.entity), matrix)?;
        }
        for table in report.ranks.values() {
            self.write_json(&format!("{}.ranks.json", table.entity), table)?;
        }
        self.write_json("summary.json", &report.summary())?;

        info!(dir = %self.dir.display(), run_id = %report.run_id, "results persisted");
        Ok(())
    }
}
