//! Export shaping of aggregated results, and the import shim for model definitions.
//!
//! Exported percentiles follow the reserves-reporting exceedance convention:
//! `P90` is the value exceeded with 90% probability, i.e. the raw 10th
//! percentile, and `P10` is the raw 90th percentile. `P50`, `Mean` and `Std`
//! pass through.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_dist::Distribution;
use volsim_prop::Stats;

use crate::facets::{Include, PropertyAggregator};
use crate::model::Model;

/// Key of the synthetic per-region risked entry.
pub const RESULT_PROBABILITY: &str = "result_probability";

/// Legacy top-level key older definitions use for `regions`.
pub const LEGACY_REGIONS_KEY: &str = "config";

/// Risked values below this magnitude are floating-point noise.
pub const NOISE_FLOOR: f64 = 1e-5;

/// Export mapping: region → entry name → entry.
pub type Export = IndexMap<String, IndexMap<String, ExportEntry>>;

/// Relabeled statistics; percentiles are `[value, label]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExportStats {
    /// Conservative estimate (raw 10th percentile).
    #[serde(rename = "P90")]
    pub p90: (f64, u8),
    /// Median.
    #[serde(rename = "P50")]
    pub p50: (f64, u8),
    /// Optimistic estimate (raw 90th percentile).
    #[serde(rename = "P10")]
    pub p10: (f64, u8),
    /// Mean.
    #[serde(rename = "Mean")]
    pub mean: f64,
    /// Population standard deviation.
    #[serde(rename = "Std")]
    pub std: f64,
    /// Smallest distribution sample, when the property has a sample set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_min: Option<f64>,
    /// Largest distribution sample, when the property has a sample set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_max: Option<f64>,
}

impl ExportStats {
    /// Swaps raw P10/P90 into exceedance labels.
    pub fn relabel(stats: &Stats) -> Self {
        Self {
            p90: (stats.p10, 90),
            p50: (stats.p50, 50),
            p10: (stats.p90, 10),
            mean: stats.mean,
            std: stats.std,
            distribution_min: None,
            distribution_max: None,
        }
    }
}

/// One exported property (or the synthetic risked entry).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    /// Sample values.
    pub values: Vec<f64>,
    /// Relabeled statistics; absent for a region without a risked result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ExportStats>,
    /// Distribution sample set; absent on the synthetic risked entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Vec<f64>>,
}

/// Replaces NaN with zero and snaps near-zero noise to zero.
pub fn clean_probability_values(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&x| if x.is_nan() || x.abs() < NOISE_FLOOR { 0.0 } else { x })
        .collect()
}

/// Shapes every region's inputs and results, plus a `result_probability`
/// entry per region, into the export mapping.
pub fn send<A: PropertyAggregator + ?Sized>(aggregator: &A) -> Result<Export, VolError> {
    let mut export = Export::new();
    for (region, facets) in aggregator.region_facets(&Include::ALL) {
        let mut entries = IndexMap::new();
        for (name, facet) in &facets.properties {
            if *name == RESULT_PROBABILITY {
                return Err(VolError::InvalidInput(
                    ErrorInfo::new("reserved-name", "property name collides with the risked entry")
                        .with_context("region", region)
                        .with_context("property", *name),
                ));
            }
            let stats = facet.stats.ok_or_else(|| {
                VolError::InvalidInput(
                    ErrorInfo::new("not-evaluated", "property has no statistics to export")
                        .with_context("region", region)
                        .with_context("property", *name)
                        .with_hint("run the model before exporting"),
                )
            })?;
            let mut shaped = ExportStats::relabel(stats);
            if let Some((min, max)) = facet.distribution.and_then(Distribution::sample_range) {
                shaped.distribution_min = Some(min);
                shaped.distribution_max = Some(max);
            }
            entries.insert(
                name.to_string(),
                ExportEntry {
                    values: facet.values.to_vec(),
                    stats: Some(shaped),
                    distribution: Some(
                        facet
                            .distribution
                            .map(|dist| dist.samples().to_vec())
                            .unwrap_or_default(),
                    ),
                },
            );
        }
        entries.insert(
            RESULT_PROBABILITY.to_string(),
            ExportEntry {
                values: clean_probability_values(facets.values_probability),
                stats: facets.probability_stats.map(ExportStats::relabel),
                distribution: None,
            },
        );
        export.insert(region.to_string(), entries);
    }
    info!(regions = export.len(), "export shaped");
    Ok(export)
}

/// Rebuilds a model from a definition mapping, renaming a legacy `config`
/// key to `regions` first.
pub fn receive(definition: Value) -> Result<Model, VolError> {
    let Value::Object(mut map) = definition else {
        return Err(VolError::InvalidInput(ErrorInfo::new(
            "model-not-mapping",
            "a model definition must be a mapping",
        )));
    };
    if let Some(regions) = map.remove(LEGACY_REGIONS_KEY) {
        warn!(
            from = LEGACY_REGIONS_KEY,
            to = "regions",
            "renaming legacy top-level key"
        );
        map.insert("regions".to_string(), regions);
    }
    Model::deserialize(&Value::Object(map))
}

/// Writes an export mapping as pretty JSON.
pub fn write_export(export: &Export, path: &Path) -> Result<(), VolError> {
    let json = serde_json::to_string_pretty(export).map_err(|err| {
        VolError::Serde(
            ErrorInfo::new("export-serialize", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    fs::write(path, json).map_err(|err| VolError::from_io("export-write", err, path))
}
