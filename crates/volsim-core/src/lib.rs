#![deny(missing_docs)]
#![doc = "Core contracts shared by the volsim volumetrics engine: errors, seeding and the evaluator seam."]

use std::collections::BTreeMap;

pub mod canonical;
pub mod errors;
pub mod provenance;
pub mod rng;

pub use canonical::{stable_hash_string, to_canonical_json_bytes};
pub use errors::{ErrorInfo, VolError};
pub use provenance::{RunProvenance, EXPORT_SCHEMA_VERSION};
pub use rng::{derive_substream_seed, RngHandle};

/// Variable name to sample array bindings handed to an equation.
///
/// Sample `i` of every bound array belongs to the same Monte Carlo trial.
pub type Bindings = BTreeMap<String, Vec<f64>>;

/// Contract for turning equation text into an elementwise sample array.
///
/// Implementations must be pure: identical text and bindings yield identical
/// output. Unknown identifiers and malformed syntax fail with
/// [`VolError::Evaluation`].
pub trait EquationEvaluator: Send + Sync {
    /// Evaluates `text` against the supplied variable bindings.
    fn evaluate(&self, text: &str, bindings: &Bindings) -> Result<Vec<f64>, VolError>;

    /// Lists the identifiers `text` reads from its bindings, in first-use order.
    fn variables(&self, text: &str) -> Result<Vec<String>, VolError>;
}
