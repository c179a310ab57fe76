//! Closed set of persisted property fields and bulk updates over them.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_dist::Distribution;

use crate::property::{Property, PropertyKind};
use crate::stats::Stats;

/// Named field of a [`Property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyField {
    /// `name`
    Name,
    /// `variable`
    Variable,
    /// `kind`
    Kind,
    /// `distribution`
    Distribution,
    /// `equation`
    Equation,
    /// `values`
    Values,
    /// `stats`
    Stats,
    /// `probability`
    Probability,
    /// `values_probability`
    ValuesProbability,
    /// `probability_stats`
    ProbabilityStats,
}

impl PropertyField {
    /// Every field, in serialized order.
    pub const ALL: [PropertyField; 10] = [
        PropertyField::Name,
        PropertyField::Variable,
        PropertyField::Kind,
        PropertyField::Distribution,
        PropertyField::Equation,
        PropertyField::Values,
        PropertyField::Stats,
        PropertyField::Probability,
        PropertyField::ValuesProbability,
        PropertyField::ProbabilityStats,
    ];

    /// Key used in the serialized mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyField::Name => "name",
            PropertyField::Variable => "variable",
            PropertyField::Kind => "kind",
            PropertyField::Distribution => "distribution",
            PropertyField::Equation => "equation",
            PropertyField::Values => "values",
            PropertyField::Stats => "stats",
            PropertyField::Probability => "probability",
            PropertyField::ValuesProbability => "values_probability",
            PropertyField::ProbabilityStats => "probability_stats",
        }
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyField {
    type Err = VolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `prop_type` is the key older files use for the kind
        if s == "prop_type" {
            return Ok(PropertyField::Kind);
        }
        PropertyField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                VolError::UnknownAttribute(
                    ErrorInfo::new("unknown-field", format!("property has no field `{s}`"))
                        .with_context("field", s),
                )
            })
    }
}

fn wrong_type(field: PropertyField, expected: &str) -> VolError {
    VolError::InvalidInput(
        ErrorInfo::new(
            "field-type",
            format!("`{field}` expects {expected}"),
        )
        .with_context("field", field.as_str()),
    )
}

fn kind_mismatch(property: &Property, field: PropertyField) -> VolError {
    VolError::InvalidPropertyDefinition(
        ErrorInfo::new(
            "kind-mismatch",
            format!("`{field}` does not apply to a {} property", property.kind.label()),
        )
        .with_context("property", property.name.as_str())
        .with_context("field", field.as_str()),
    )
}

/// Reads a numeric array; nulls (non-finite values on the wire) become NaN.
pub(crate) fn numbers_from(field: PropertyField, value: &Value) -> Result<Vec<f64>, VolError> {
    let items = value
        .as_array()
        .ok_or_else(|| wrong_type(field, "an array of numbers"))?;
    items
        .iter()
        .map(|item| match item {
            Value::Null => Ok(f64::NAN),
            other => other
                .as_f64()
                .ok_or_else(|| wrong_type(field, "an array of numbers")),
        })
        .collect()
}

/// Reads an optional statistic set; `null`, `0` and `{}` all mean unset.
pub(crate) fn stats_from(field: PropertyField, value: &Value) -> Result<Option<Stats>, VolError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(_) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|_| wrong_type(field, "a mapping of P10, P50, P90, Mean and Std")),
        _ => Err(wrong_type(field, "a statistics mapping")),
    }
}

/// Reads an optional probability; `null` and `0` mean unset.
pub(crate) fn probability_from(value: &Value) -> Result<Option<f64>, VolError> {
    match value {
        Value::Null => Ok(None),
        other => match other.as_f64() {
            Some(p) if p == 0.0 => Ok(None),
            Some(p) => Ok(Some(p)),
            None => Err(wrong_type(PropertyField::Probability, "a number")),
        },
    }
}

fn string_from(field: PropertyField, value: &Value) -> Result<String, VolError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(field, "a string"))
}

impl Property {
    /// Applies field/value pairs by name, all or nothing.
    ///
    /// Keys are parsed first, so an unknown field fails with
    /// [`VolError::UnknownAttribute`]. Values are then applied to a copy that
    /// replaces the property only when every pair succeeded; a wrong value
    /// type or a field of the other kind leaves the property as it was.
    pub fn update(&mut self, fields: &Map<String, Value>) -> Result<(), VolError> {
        let parsed = fields
            .iter()
            .map(|(key, value)| Ok((key.parse::<PropertyField>()?, value)))
            .collect::<Result<Vec<_>, VolError>>()?;
        let mut staged = self.clone();
        for (field, value) in parsed {
            staged.set_field(field, value)?;
        }
        *self = staged;
        Ok(())
    }

    /// Assigns one field from its serialized value.
    ///
    /// The kind cannot be changed: setting `equation` on an input, or
    /// `distribution` on a result, fails with
    /// [`VolError::InvalidPropertyDefinition`].
    pub fn set_field(&mut self, field: PropertyField, value: &Value) -> Result<(), VolError> {
        match field {
            PropertyField::Name => self.name = string_from(field, value)?,
            PropertyField::Variable => self.variable = string_from(field, value)?,
            PropertyField::Kind => {
                let label = string_from(field, value)?;
                if !label.eq_ignore_ascii_case(self.kind.label()) {
                    return Err(kind_mismatch(self, field));
                }
            }
            PropertyField::Distribution => {
                if !self.is_input() {
                    return Err(kind_mismatch(self, field));
                }
                let replacement = Distribution::from_value(value)?;
                if let PropertyKind::Input { distribution } = &mut self.kind {
                    *distribution = replacement;
                }
            }
            PropertyField::Equation => {
                if !self.is_result() {
                    return Err(kind_mismatch(self, field));
                }
                let text = string_from(field, value)?;
                if let PropertyKind::Result { equation } = &mut self.kind {
                    *equation = text;
                }
            }
            PropertyField::Values => self.values = numbers_from(field, value)?,
            PropertyField::Stats => self.stats = stats_from(field, value)?,
            PropertyField::Probability => self.probability = probability_from(value)?,
            PropertyField::ValuesProbability => {
                // a bare 0 marks "never risked" in older files
                self.values_probability = match value {
                    Value::Number(n) if n.as_f64() == Some(0.0) => Vec::new(),
                    other => numbers_from(field, other)?,
                }
            }
            PropertyField::ProbabilityStats => {
                self.probability_stats = stats_from(field, value)?
            }
        }
        Ok(())
    }
}
