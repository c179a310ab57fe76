use std::path::Path;

use volsim_core::errors::{ErrorInfo, VolError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("property", "Area")
        .with_context("reason", "example")
}

#[test]
fn property_definition_error_surface() {
    let err = VolError::InvalidPropertyDefinition(sample_info("both-sources", "ambiguous kind"));
    assert_eq!(err.info().code, "both-sources");
    assert!(err.info().context.contains_key("property"));
}

#[test]
fn probability_error_surface() {
    let err = VolError::InvalidProbabilityRange(sample_info("probability-range", "p = 1"));
    assert_eq!(err.info().code, "probability-range");
    assert!(err.to_string().starts_with("invalid probability range"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = VolError::UnknownAttribute(
        ErrorInfo::new("unknown-attribute", "no such field")
            .with_context("field", "colour")
            .with_hint("see PropertyField"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("field=colour"));
    assert!(rendered.contains("hint: see PropertyField"));
}

#[test]
fn missing_path_maps_to_file_not_found() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err = VolError::from_io("read", io, Path::new("missing.json"));
    assert!(matches!(err, VolError::FileNotFound(_)));
    assert_eq!(err.info().context["path"], "missing.json");

    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
    let err = VolError::from_io("read", io, Path::new("locked.json"));
    assert!(matches!(err, VolError::Io(_)));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = VolError::Evaluation(ErrorInfo::new("unknown-identifier", "x"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Evaluation");
    let decoded: VolError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn context_can_be_added_after_the_fact() {
    let err = VolError::Dependency(ErrorInfo::new("cycle", "loop")).with_context("region", "North");
    assert!(matches!(err, VolError::Dependency(_)));
    assert_eq!(err.info().context["region"], "North");
}
