#![deny(missing_docs)]
#![doc = "Monte Carlo properties for volumetrics: sampling, equations, risking, statistics and persistence."]

pub mod compose;
pub mod field;
pub mod property;
pub mod risk;
pub mod serial;
pub mod stats;

pub use compose::{compose, negate, BinaryOp, Operand};
pub use field::PropertyField;
pub use property::{Property, PropertyKind};
pub use risk::{risk, Risked};
pub use serial::DEFAULT_EXCLUDE;
pub use stats::{mean, percentile, percentiles, std_dev, Stats};
