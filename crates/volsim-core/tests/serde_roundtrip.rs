use serde_json::json;
use volsim_core::provenance::{RunProvenance, EXPORT_SCHEMA_VERSION};
use volsim_core::{stable_hash_string, to_canonical_json_bytes};

#[test]
fn provenance_survives_canonical_encoding() {
    let provenance = RunProvenance::new("abc123", Some(99), "2026-01-31T00:00:00+00:00")
        .with_tool("volsim-core", "0.1.0");

    let bytes = to_canonical_json_bytes(&provenance).unwrap();
    let decoded: RunProvenance = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(decoded, provenance);
    assert_eq!(decoded.schema_version, EXPORT_SCHEMA_VERSION);
}

#[test]
fn unseeded_provenance_omits_the_seed_and_defaults_the_schema() {
    let value = serde_json::to_value(RunProvenance::new("h", None, "t")).unwrap();
    assert!(value.get("seed").is_none());

    let decoded: RunProvenance = serde_json::from_value(json!({
        "input_hash": "h",
        "created_at": "t",
        "tool_versions": {}
    }))
    .unwrap();
    assert_eq!(decoded.schema_version, EXPORT_SCHEMA_VERSION);
    assert_eq!(decoded.seed, None);
}

#[test]
fn canonical_bytes_sort_nested_keys() {
    let value = json!({"b": 1, "a": {"y": [{"d": 0, "c": 1}], "x": 3}});
    let bytes = to_canonical_json_bytes(&value).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"a":{"x":3,"y":[{"c":1,"d":0}]},"b":1}"#
    );
}

#[test]
fn canonical_hash_ignores_key_order() {
    let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
    let b = json!({"a": {"x": 3, "y": 2}, "b": 1});
    assert_eq!(
        stable_hash_string(&a).unwrap(),
        stable_hash_string(&b).unwrap()
    );
}
