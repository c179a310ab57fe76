use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::tempdir;
use volsim_core::VolError;
use volsim_model::{Model, RunManifest, SimulationConfig};

fn small_model() -> Model {
    Model::deserialize(&json!({
        "name": "Tiny",
        "num_samples": 50,
        "regions": {
            "Only": {
                "properties": {
                    "Area": {
                        "variable": "area",
                        "distribution": {"name": "uniform", "parameters": {"min": 1.0, "max": 2.0}}
                    }
                }
            }
        }
    }))
    .unwrap()
}

#[test]
fn yaml_config_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sim.yaml");
    fs::write(&path, "num_samples: 250\nseed_policy:\n  master_seed: 11\n").unwrap();

    let config = SimulationConfig::load(&path).unwrap();
    assert_eq!(config.num_samples, 250);
    assert_eq!(config.seed_policy.master_seed, Some(11));
    assert_eq!(config.seed_policy.label, None);
    assert_eq!(config.output.export_file, PathBuf::from("export.json"));
    assert_eq!(config.output.manifest_file, PathBuf::from("manifest.json"));
}

#[test]
fn json_config_is_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sim.json");
    fs::write(&path, r#"{"output": {"export_file": "out.json"}}"#).unwrap();

    let config = SimulationConfig::load(&path).unwrap();
    assert_eq!(config.num_samples, 10_000);
    assert_eq!(config.output.export_file, PathBuf::from("out.json"));
    assert_eq!(config.output.model_file, PathBuf::from("model.json"));
}

#[test]
fn malformed_config_is_a_serde_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sim.yaml");
    fs::write(&path, "num_samples: [not, a, number]").unwrap();
    let err = SimulationConfig::load(&path).unwrap_err();
    assert!(matches!(err, VolError::Serde(_)));
}

#[test]
fn config_overrides_sample_count_and_seed() {
    let mut model = small_model();
    let mut config = SimulationConfig::default();
    config.num_samples = 64;
    config.seed_policy.master_seed = Some(5);
    model.apply_config(&config).unwrap();
    assert_eq!(model.num_samples(), 64);
    assert_eq!(model.seed(), Some(5));

    model.run().unwrap();
    let area = model.region("Only").unwrap().property("Area").unwrap();
    assert_eq!(area.values().len(), 64);
}

#[test]
fn manifest_round_trips() {
    let dir = tempdir().unwrap();
    let mut model = small_model();
    model.set_seed(Some(3));
    let config = SimulationConfig::default();
    let manifest = RunManifest::for_run(&model, &config).unwrap();
    assert_eq!(manifest.regions, vec!["Only".to_string()]);
    assert_eq!(manifest.provenance.seed, Some(3));
    assert_eq!(manifest.provenance.input_hash, model.input_hash().unwrap());
    assert!(manifest.provenance.tool_versions.contains_key("volsim-model"));

    let path = dir.path().join("nested").join("manifest.json");
    manifest.write(&path).unwrap();
    let back = RunManifest::load(&path).unwrap();
    assert_eq!(back, manifest);
}
