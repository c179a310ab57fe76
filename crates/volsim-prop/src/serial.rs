//! Plain-data form of a property and its file persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_dist::Distribution;

use crate::field::{probability_from, stats_from, PropertyField};
use crate::property::{Property, PropertyKind};

/// Fields left out of [`Property::serialize_default`]: identity and runtime data.
pub const DEFAULT_EXCLUDE: [PropertyField; 4] = [
    PropertyField::Name,
    PropertyField::Kind,
    PropertyField::Values,
    PropertyField::Stats,
];

fn numbers(values: &[f64]) -> Value {
    Value::Array(values.iter().map(|&x| Value::from(x)).collect())
}

fn serde_error(code: &str, err: impl ToString) -> VolError {
    VolError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn stats_value(stats: Option<&crate::Stats>) -> Result<Value, VolError> {
    match stats {
        Some(stats) => serde_json::to_value(stats).map_err(|err| serde_error("stats-serialize", err)),
        None => Ok(Value::Object(Map::new())),
    }
}

impl Property {
    /// Serializes every field not listed in `exclude`.
    ///
    /// Only the backing that matches the kind is written: inputs carry a
    /// nested `distribution`, results an `equation`. An unset probability is
    /// written as `0` and unset statistics as `{}`.
    pub fn serialize(&self, exclude: &[PropertyField]) -> Result<Map<String, Value>, VolError> {
        let mut out = Map::new();
        for field in PropertyField::ALL {
            if exclude.contains(&field) {
                continue;
            }
            let value = match field {
                PropertyField::Name => Value::from(self.name.as_str()),
                PropertyField::Variable => Value::from(self.variable.as_str()),
                PropertyField::Kind => Value::from(self.kind.label()),
                PropertyField::Distribution => match &self.kind {
                    PropertyKind::Input { distribution } => distribution.to_value()?,
                    PropertyKind::Result { .. } => continue,
                },
                PropertyField::Equation => match &self.kind {
                    PropertyKind::Result { equation } => Value::from(equation.as_str()),
                    PropertyKind::Input { .. } => continue,
                },
                PropertyField::Values => numbers(&self.values),
                PropertyField::Stats => stats_value(self.stats.as_ref())?,
                PropertyField::Probability => Value::from(self.probability.unwrap_or(0.0)),
                PropertyField::ValuesProbability => numbers(&self.values_probability),
                PropertyField::ProbabilityStats => stats_value(self.probability_stats.as_ref())?,
            };
            out.insert(field.as_str().to_string(), value);
        }
        Ok(out)
    }

    /// Serializes with [`DEFAULT_EXCLUDE`].
    pub fn serialize_default(&self) -> Result<Map<String, Value>, VolError> {
        self.serialize(&DEFAULT_EXCLUDE)
    }

    /// Rebuilds a property from its serialized mapping.
    ///
    /// A nested distribution with a `name` makes an input; otherwise an
    /// `equation` makes a result. A missing name defaults to `"property"` and
    /// a missing variable to the lower-cased name. Remaining keys are applied
    /// as fields, so an unrecognised key fails with
    /// [`VolError::UnknownAttribute`].
    pub fn deserialize(value: &Value) -> Result<Self, VolError> {
        let Some(map) = value.as_object() else {
            return Err(VolError::InvalidInput(
                ErrorInfo::new(
                    "not-a-mapping",
                    "can't deserialize a property from a non-mapping value",
                )
                .with_hint("expected a JSON object"),
            ));
        };
        let mut rest = map.clone();

        let name = match rest.remove("name") {
            Some(Value::String(name)) => name,
            _ => "property".to_string(),
        };
        let variable = match rest.remove("variable") {
            Some(Value::String(variable)) => variable,
            _ => name.to_lowercase(),
        };

        let distribution_value = rest.remove("distribution");
        let equation_value = rest.remove("equation");
        let distribution = match &distribution_value {
            Some(spec) if spec.get("name").is_some_and(|name| !name.is_null()) => {
                Some(Distribution::from_value(spec)?)
            }
            _ => None,
        };
        let equation = match (&distribution, equation_value) {
            (Some(_), _) => None,
            (None, Some(Value::String(text))) => Some(text),
            (None, _) => None,
        };
        let mut property = Property::from_parts(name, variable, distribution, equation)?;

        if let Some(probability) = rest.remove("probability") {
            property.probability = probability_from(&probability)?;
        }
        if let Some(stats) = rest.remove("probability_stats") {
            property.probability_stats = stats_from(PropertyField::ProbabilityStats, &stats)?;
        }
        property.update(&rest)?;
        Ok(property)
    }

    /// Writes the full serialized form to `Random Property <name>.json` in `dir`.
    pub fn to_json_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf, VolError> {
        let path = dir
            .as_ref()
            .join(format!("Random Property {}.json", self.name));
        let body = serde_json::to_string_pretty(&Value::Object(self.serialize(&[])?))
            .map_err(|err| serde_error("property-serialize", err))?;
        fs::write(&path, body).map_err(|err| VolError::from_io("property-write", err, &path))?;
        debug!(property = %self.name, path = %path.display(), "property persisted");
        Ok(path)
    }

    /// Loads a property written by [`Property::to_json_file`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VolError> {
        let path = path.as_ref();
        let body =
            fs::read_to_string(path).map_err(|err| VolError::from_io("property-read", err, path))?;
        let value: Value =
            serde_json::from_str(&body).map_err(|err| serde_error("property-parse", err))?;
        Self::deserialize(&value)
    }
}
