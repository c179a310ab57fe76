#![deny(missing_docs)]
#![doc = "Sampling distributions backing volsim input properties."]

/// Distribution wrapper owning the sample count, seed and last draw.
pub mod distribution;
/// Parametric families and their samplers.
pub mod family;

pub use distribution::{Distribution, DistributionRecord, DEFAULT_NUM_SAMPLES};
pub use family::Family;
