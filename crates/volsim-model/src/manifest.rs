use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::provenance::RunProvenance;

use crate::config::SimulationConfig;
use crate::model::Model;

/// Record of a completed run, written next to its export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Definition hash, seed, timestamp and tool versions.
    pub provenance: RunProvenance,
    /// Configuration used for the run.
    pub config: SimulationConfig,
    /// Export file (relative to the output directory).
    pub export_file: PathBuf,
    /// Serialized model definition (relative to the output directory).
    pub model_file: PathBuf,
    /// Regions in evaluation order.
    pub regions: Vec<String>,
}

impl RunManifest {
    /// Describes a run of `model` under `config`.
    pub fn for_run(model: &Model, config: &SimulationConfig) -> Result<Self, VolError> {
        let provenance =
            RunProvenance::new(model.input_hash()?, model.seed(), Utc::now().to_rfc3339())
                .with_tool("volsim-model", env!("CARGO_PKG_VERSION"));
        Ok(Self {
            provenance,
            config: config.clone(),
            export_file: config.output.export_file.clone(),
            model_file: config.output.model_file.clone(),
            regions: model.regions().keys().cloned().collect(),
        })
    }

    /// Writes the manifest to a JSON file, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), VolError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| VolError::from_io("manifest-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            VolError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| VolError::from_io("manifest-write", err, path))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, VolError> {
        let contents =
            fs::read_to_string(path).map_err(|err| VolError::from_io("manifest-read", err, path))?;
        serde_json::from_str(&contents).map_err(|err| {
            VolError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
