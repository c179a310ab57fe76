#![deny(missing_docs)]
#![doc = "Region and model aggregation, result shaping, run configuration and manifests."]

/// Run configuration loaded from YAML or JSON.
pub mod config;
pub mod facets;
/// Run manifests written next to exports.
pub mod manifest;
pub mod model;
pub mod region;
pub mod shaper;

pub use config::{OutputConfig, SeedPolicy, SimulationConfig};
pub use facets::{Include, PropertyAggregator, PropertyFacet, RegionFacets};
pub use manifest::RunManifest;
pub use model::Model;
pub use region::Region;
pub use shaper::{receive, send, write_export, Export, ExportEntry, ExportStats};
