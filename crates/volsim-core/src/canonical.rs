//! Key-sorted JSON and the definition hash built on it.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, VolError};

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

/// Compact JSON with every object's keys sorted, independent of insertion order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, VolError> {
    let value = serde_json::to_value(value)
        .map_err(|err| VolError::Serde(ErrorInfo::new("json-serialize", err.to_string())))?;
    serde_json::to_vec(&sort_keys(value))
        .map_err(|err| VolError::Serde(ErrorInfo::new("json-write", err.to_string())))
}

/// Lowercase hex SHA-256 of the canonical encoding.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, VolError> {
    let digest = Sha256::digest(to_canonical_json_bytes(value)?);
    Ok(format!("{digest:x}"))
}
