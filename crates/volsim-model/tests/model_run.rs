use serde_json::json;
use tempfile::tempdir;
use volsim_core::VolError;
use volsim_model::{Model, Region};

fn definition() -> serde_json::Value {
    json!({
        "name": "Field A",
        "num_samples": 2000,
        "seed": 42,
        "regions": {
            "North": {
                "properties": {
                    "Volume": {
                        "variable": "vol",
                        "equation": "area * h * poro",
                        "probability": 0.9
                    },
                    "Area": {
                        "variable": "area",
                        "distribution": {"name": "uniform", "parameters": {"min": 100.0, "max": 200.0}}
                    },
                    "Thickness": {
                        "variable": "h",
                        "distribution": {"name": "normal", "parameters": {"mean": 20.0, "std": 2.0}}
                    },
                    "Porosity": {
                        "variable": "poro",
                        "distribution": {"name": "triangular", "parameters": {"min": 0.1, "mode": 0.2, "max": 0.3}}
                    }
                }
            },
            "South": {
                "properties": {
                    "Area": {
                        "variable": "area",
                        "distribution": {"name": "constant", "parameters": {"value": 5.0}}
                    }
                }
            }
        }
    })
}

#[test]
fn run_enforces_shared_sample_count_and_order() {
    let mut model = Model::deserialize(&definition()).unwrap();
    model.run().unwrap();

    let north = model.region("North").unwrap();
    assert_eq!(
        north.evaluation_order().unwrap(),
        vec!["Area", "Thickness", "Porosity", "Volume"]
    );
    for property in north.properties().values() {
        assert_eq!(property.values().len(), 2000, "{}", property.name());
    }
    let risked = north.risked().unwrap();
    assert_eq!(risked.name(), "Volume");
    assert_eq!(risked.values_probability().len(), 2000);

    let south = model.region("South").unwrap();
    assert!(south.risked().is_none());
    assert_eq!(south.property("Area").unwrap().values(), &[5.0; 2000][..]);
}

#[test]
fn seeded_runs_replay_exactly() {
    let mut first = Model::deserialize(&definition()).unwrap();
    let mut second = Model::deserialize(&definition()).unwrap();
    first.run().unwrap();
    second.run().unwrap();
    let a = first.region("North").unwrap().property("Volume").unwrap();
    let b = second.region("North").unwrap().property("Volume").unwrap();
    assert_eq!(a.values(), b.values());
}

#[test]
fn definition_round_trips_through_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let model = Model::deserialize(&definition()).unwrap();
    model.to_json_file(&path).unwrap();

    let back = Model::from_json_file(&path).unwrap();
    assert_eq!(back.name(), "Field A");
    assert_eq!(back.num_samples(), 2000);
    assert_eq!(back.seed(), Some(42));
    assert_eq!(back.input_hash().unwrap(), model.input_hash().unwrap());
    let volume = back.region("North").unwrap().property("Volume").unwrap();
    assert_eq!(volume.equation(), Some("area * h * poro"));
    assert_eq!(volume.probability(), Some(0.9));
}

#[test]
fn missing_model_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = Model::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, VolError::FileNotFound(_)));
}

#[test]
fn failures_abort_the_pass_with_location() {
    let mut bad = definition();
    bad["regions"]["North"]["properties"]["Volume"]["probability"] = json!(1.5);
    let mut model = Model::deserialize(&bad).unwrap();
    let err = model.run().unwrap_err();
    assert!(matches!(err, VolError::InvalidProbabilityRange(_)));
    assert_eq!(err.info().context["region"], "North");
    assert_eq!(err.info().context["property"], "Volume");
}

#[test]
fn non_mapping_definitions_are_rejected() {
    let err = Model::deserialize(&json!("regions")).unwrap_err();
    assert!(matches!(err, VolError::InvalidInput(_)));
    let err = Model::deserialize(&json!({"name": "x"})).unwrap_err();
    assert_eq!(err.info().code, "missing-regions");
}

#[test]
fn duplicate_regions_are_rejected() {
    let mut model = Model::new("m", 10).unwrap();
    model.add_region(Region::new("A")).unwrap();
    let err = model.add_region(Region::new("A")).unwrap_err();
    assert_eq!(err.info().code, "duplicate-region");
}

#[test]
fn malformed_seeds_are_rejected() {
    for seed in [json!(-1), json!("7"), json!(7.5)] {
        let mut bad = definition();
        bad["seed"] = seed.clone();
        let err = Model::deserialize(&bad).unwrap_err();
        assert!(matches!(err, VolError::InvalidInput(_)), "{seed}");
        assert_eq!(err.info().code, "seed-type");
    }

    let mut unseeded = definition();
    unseeded["seed"] = json!(null);
    assert_eq!(Model::deserialize(&unseeded).unwrap().seed(), None);
}
