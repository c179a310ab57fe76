use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::RngHandle;

use crate::family::Family;

/// Sample count used when a definition does not name one.
pub const DEFAULT_NUM_SAMPLES: usize = 10_000;

fn default_num_samples() -> usize {
    DEFAULT_NUM_SAMPLES
}

/// Plain-data form of a [`Distribution`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionRecord {
    /// Family name.
    pub name: String,
    /// Named family parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Values produced per draw.
    #[serde(default = "default_num_samples")]
    pub num_samples: usize,
    /// Optional fixed seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A named family with fixed parameters that produces `num_samples` draws on demand.
///
/// The most recent draw is retained as the distribution's sample set and is
/// what exports report as the distribution summary. It is runtime state and
/// is not part of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DistributionRecord", into = "DistributionRecord")]
pub struct Distribution {
    family: Family,
    num_samples: usize,
    seed: Option<u64>,
    samples: Vec<f64>,
}

impl TryFrom<DistributionRecord> for Distribution {
    type Error = VolError;

    fn try_from(record: DistributionRecord) -> Result<Self, Self::Error> {
        let family = Family::from_parts(&record.name, &record.parameters)?;
        let mut distribution = Distribution::new(family, record.num_samples)?;
        distribution.seed = record.seed;
        Ok(distribution)
    }
}

impl From<Distribution> for DistributionRecord {
    fn from(distribution: Distribution) -> Self {
        DistributionRecord {
            name: distribution.family.name().to_string(),
            parameters: distribution.family.parameters(),
            num_samples: distribution.num_samples,
            seed: distribution.seed,
        }
    }
}

fn check_num_samples(num_samples: usize) -> Result<(), VolError> {
    if num_samples == 0 {
        return Err(VolError::InvalidInput(
            ErrorInfo::new("empty-sample-count", "a distribution must draw at least one sample")
                .with_context("num_samples", "0"),
        ));
    }
    Ok(())
}

impl Distribution {
    /// Creates an unseeded distribution drawing `num_samples` values per call.
    pub fn new(family: Family, num_samples: usize) -> Result<Self, VolError> {
        family.validate()?;
        check_num_samples(num_samples)?;
        Ok(Self {
            family,
            num_samples,
            seed: None,
            samples: Vec::new(),
        })
    }

    /// Fixes the seed so repeated draws replay the same sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Family name, e.g. `"uniform"`.
    pub fn name(&self) -> &'static str {
        self.family.name()
    }

    /// Underlying family and parameters.
    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Number of values produced per draw.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Changes the per-draw sample count.
    pub fn set_num_samples(&mut self, num_samples: usize) -> Result<(), VolError> {
        check_num_samples(num_samples)?;
        self.num_samples = num_samples;
        Ok(())
    }

    /// Seed fixed at construction, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Values produced by the most recent draw; empty before the first draw.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Minimum and maximum of the current sample set.
    pub fn sample_range(&self) -> Option<(f64, f64)> {
        if self.samples.is_empty() {
            return None;
        }
        let (min, max) = self
            .samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        Some((min, max))
    }

    /// Draws `num_samples` values and keeps them as the sample set.
    ///
    /// An explicit handle wins; otherwise the distribution's own seed is used,
    /// and without one the draw is seeded from OS entropy.
    pub fn draw(&mut self, rng: Option<&mut RngHandle>) -> Result<Vec<f64>, VolError> {
        let samples = match rng {
            Some(rng) => self.family.sample(rng, self.num_samples)?,
            None => {
                let mut own = RngHandle::from_optional_seed(self.seed);
                self.family.sample(&mut own, self.num_samples)?
            }
        };
        debug!(
            family = self.family.name(),
            samples = samples.len(),
            "distribution drawn"
        );
        self.samples = samples.clone();
        Ok(samples)
    }

    /// Serializes to the plain-data mapping `{name, parameters, num_samples, seed?}`.
    pub fn to_value(&self) -> Result<Value, VolError> {
        serde_json::to_value(self).map_err(|err| {
            VolError::Serde(ErrorInfo::new("distribution-serialize", err.to_string()))
        })
    }

    /// Rebuilds a distribution from its plain-data mapping.
    pub fn from_value(value: &Value) -> Result<Self, VolError> {
        if !value.is_object() {
            return Err(VolError::InvalidInput(ErrorInfo::new(
                "distribution-not-mapping",
                "can't deserialize a distribution from a non-mapping value",
            )));
        }
        let record: DistributionRecord = serde_json::from_value(value.clone()).map_err(|err| {
            VolError::Serde(ErrorInfo::new("distribution-deserialize", err.to_string()))
        })?;
        Distribution::try_from(record)
    }
}
