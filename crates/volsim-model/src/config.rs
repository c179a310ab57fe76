use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_dist::DEFAULT_NUM_SAMPLES;

/// YAML- or JSON-configurable parameters of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Monte Carlo trials per property.
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    /// Master seed and its label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output file names.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_num_samples() -> usize {
    DEFAULT_NUM_SAMPLES
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_samples: default_num_samples(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Reads a configuration file. JSON is accepted as a subset of YAML.
    pub fn load(path: &Path) -> Result<Self, VolError> {
        let contents =
            fs::read_to_string(path).map_err(|err| VolError::from_io("config-read", err, path))?;
        serde_yaml::from_str(&contents).map_err(|err| {
            VolError::Serde(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed; without one every run draws from OS entropy.
    #[serde(default)]
    pub master_seed: Option<u64>,
    /// Free-form label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

/// Output file layout, relative to the run's output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Export mapping filename.
    #[serde(default = "default_export_filename")]
    pub export_file: PathBuf,
    /// Manifest filename.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Serialized model definition filename.
    #[serde(default = "default_model_filename")]
    pub model_file: PathBuf,
}

fn default_export_filename() -> PathBuf {
    PathBuf::from("export.json")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_model_filename() -> PathBuf {
    PathBuf::from("model.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_file: default_export_filename(),
            manifest_file: default_manifest_filename(),
            model_file: default_model_filename(),
        }
    }
}
