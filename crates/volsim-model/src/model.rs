//! The model: named regions run with one sample count and master seed.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::info;
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::{derive_substream_seed, stable_hash_string, EquationEvaluator};
use volsim_dist::DEFAULT_NUM_SAMPLES;
use volsim_eqn::ArrayEvaluator;
use volsim_prop::{Property, PropertyField, DEFAULT_EXCLUDE};

use crate::config::SimulationConfig;
use crate::facets::{Include, PropertyAggregator, RegionFacets};
use crate::region::Region;

/// Fields left out when a model is written: identity is the mapping key and
/// everything a run produces is dropped.
const DEFINITION_EXCLUDE: [PropertyField; 6] = [
    DEFAULT_EXCLUDE[0],
    DEFAULT_EXCLUDE[1],
    DEFAULT_EXCLUDE[2],
    DEFAULT_EXCLUDE[3],
    PropertyField::ValuesProbability,
    PropertyField::ProbabilityStats,
];

fn not_mapping(code: &str, what: &str) -> VolError {
    VolError::InvalidInput(ErrorInfo::new(code, format!("{what} must be a mapping")))
}

fn serde_error(code: &str, err: impl ToString) -> VolError {
    VolError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Regions evaluated with a shared sample count.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    num_samples: usize,
    seed: Option<u64>,
    regions: IndexMap<String, Region>,
}

impl Model {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>, num_samples: usize) -> Result<Self, VolError> {
        if num_samples == 0 {
            return Err(VolError::InvalidInput(ErrorInfo::new(
                "empty-sample-count",
                "a model needs at least one sample",
            )));
        }
        Ok(Self {
            name: name.into(),
            num_samples,
            seed: None,
            regions: IndexMap::new(),
        })
    }

    /// Fixes the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Adds a region; names must be unique.
    pub fn add_region(&mut self, region: Region) -> Result<(), VolError> {
        if self.regions.contains_key(region.name()) {
            return Err(VolError::InvalidInput(
                ErrorInfo::new("duplicate-region", "region names must be unique")
                    .with_context("region", region.name()),
            ));
        }
        self.regions.insert(region.name().to_string(), region);
        Ok(())
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trials per property.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Master seed, if fixed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Regions in insertion order.
    pub fn regions(&self) -> &IndexMap<String, Region> {
        &self.regions
    }

    /// Looks a region up by name.
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    /// Mutable lookup by name.
    pub fn region_mut(&mut self, name: &str) -> Option<&mut Region> {
        self.regions.get_mut(name)
    }

    /// Applies a run configuration: its sample count, and its master seed when set.
    pub fn apply_config(&mut self, config: &SimulationConfig) -> Result<(), VolError> {
        if config.num_samples == 0 {
            return Err(VolError::InvalidInput(ErrorInfo::new(
                "empty-sample-count",
                "num_samples must be at least 1",
            )));
        }
        self.num_samples = config.num_samples;
        if let Some(seed) = config.seed_policy.master_seed {
            self.seed = Some(seed);
        }
        Ok(())
    }

    /// Overrides the master seed.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Runs every region with the default evaluator.
    pub fn run(&mut self) -> Result<(), VolError> {
        self.run_with(&ArrayEvaluator)
    }

    /// Runs regions in order; region `i` is seeded with
    /// `derive_substream_seed(master, i)` when a master seed is set.
    ///
    /// A failing region aborts the run and clears every region's results, so
    /// regions from different passes are never exported together.
    pub fn run_with(&mut self, evaluator: &dyn EquationEvaluator) -> Result<(), VolError> {
        for idx in 0..self.regions.len() {
            let seed = self
                .seed
                .map(|master| derive_substream_seed(master, idx as u64));
            let Some((_, region)) = self.regions.get_index_mut(idx) else {
                continue;
            };
            if let Err(err) = region.run_with(self.num_samples, seed, evaluator) {
                self.regions.values_mut().for_each(Region::clear_results);
                return Err(err);
            }
        }
        info!(
            model = %self.name,
            regions = self.regions.len(),
            samples = self.num_samples,
            seeded = self.seed.is_some(),
            "model run complete"
        );
        Ok(())
    }

    /// Definition mapping `{name, num_samples, seed?, regions: {r: {properties: {..}}}}`.
    pub fn serialize(&self) -> Result<Value, VolError> {
        let mut regions = Map::new();
        for (region_name, region) in &self.regions {
            let mut properties = Map::new();
            for (name, property) in region.properties() {
                properties.insert(
                    name.clone(),
                    Value::Object(property.serialize(&DEFINITION_EXCLUDE)?),
                );
            }
            let mut entry = Map::new();
            entry.insert("properties".to_string(), Value::Object(properties));
            regions.insert(region_name.clone(), Value::Object(entry));
        }

        let mut out = Map::new();
        out.insert("name".to_string(), Value::from(self.name.as_str()));
        out.insert("num_samples".to_string(), Value::from(self.num_samples));
        if let Some(seed) = self.seed {
            out.insert("seed".to_string(), Value::from(seed));
        }
        out.insert("regions".to_string(), Value::Object(regions));
        Ok(Value::Object(out))
    }

    /// Rebuilds a model from its definition mapping.
    ///
    /// Each property mapping is rebuilt with [`Property::deserialize`], named
    /// after its key.
    pub fn deserialize(value: &Value) -> Result<Self, VolError> {
        let map = value
            .as_object()
            .ok_or_else(|| not_mapping("model-not-mapping", "a model definition"))?;

        let name = map.get("name").and_then(Value::as_str).unwrap_or("model");
        let num_samples = match map.get("num_samples") {
            None | Some(Value::Null) => DEFAULT_NUM_SAMPLES,
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    VolError::InvalidInput(ErrorInfo::new(
                        "num-samples-type",
                        "num_samples must be a positive integer",
                    ))
                })?,
        };
        let mut model = Model::new(name, num_samples)?;
        model.seed = match map.get("seed") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                VolError::InvalidInput(
                    ErrorInfo::new("seed-type", "seed must be a non-negative integer")
                        .with_context("seed", value.to_string()),
                )
            })?),
        };

        let regions = map
            .get("regions")
            .ok_or_else(|| {
                VolError::InvalidInput(
                    ErrorInfo::new("missing-regions", "a model definition needs `regions`")
                        .with_hint("older definitions name this key `config`"),
                )
            })?
            .as_object()
            .ok_or_else(|| not_mapping("regions-not-mapping", "`regions`"))?;

        for (region_name, region_value) in regions {
            let properties = region_value
                .get("properties")
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    not_mapping("region-properties", "a region's `properties`")
                        .with_context("region", region_name.as_str())
                })?;
            let mut region = Region::new(region_name.as_str());
            for (property_name, property_value) in properties {
                let mut fields = property_value
                    .as_object()
                    .cloned()
                    .ok_or_else(|| {
                        not_mapping("property-not-mapping", "a property definition")
                            .with_context("property", property_name.as_str())
                    })?;
                fields.insert("name".to_string(), Value::from(property_name.as_str()));
                let property = Property::deserialize(&Value::Object(fields))
                    .map_err(|err| err.with_context("region", region_name.as_str()))?;
                region.add_property(property)?;
            }
            model.add_region(region)?;
        }
        Ok(model)
    }

    /// Stable SHA-256 of the canonical definition mapping.
    pub fn input_hash(&self) -> Result<String, VolError> {
        stable_hash_string(&self.serialize()?)
    }

    /// Writes the definition mapping as pretty JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), VolError> {
        let path = path.as_ref();
        let body = serde_json::to_string_pretty(&self.serialize()?)
            .map_err(|err| serde_error("model-serialize", err))?;
        fs::write(path, body).map_err(|err| VolError::from_io("model-write", err, path))
    }

    /// Reads a definition written by [`Model::to_json_file`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VolError> {
        let path = path.as_ref();
        let body =
            fs::read_to_string(path).map_err(|err| VolError::from_io("model-read", err, path))?;
        let value: Value = serde_json::from_str(&body).map_err(|err| {
            serde_error("model-parse", err).with_context("path", path.display().to_string())
        })?;
        Self::deserialize(&value)
    }
}

impl PropertyAggregator for Model {
    fn region_facets(&self, include: &[Include]) -> IndexMap<&str, RegionFacets<'_>> {
        self.regions
            .iter()
            .map(|(name, region)| (name.as_str(), region.facets(include)))
            .collect()
    }
}
