//! Exceedance-probability risking.

use tracing::debug;
use volsim_core::errors::{ErrorInfo, VolError};

use crate::stats::{percentile, Stats};

/// Outcome of risking a sample array.
#[derive(Debug, Clone, PartialEq)]
pub struct Risked {
    /// Percentile value the samples were cut at.
    pub threshold: f64,
    /// Copy of the input with every element above `threshold` set to zero.
    pub values: Vec<f64>,
    /// Statistics of `values`.
    pub stats: Stats,
}

/// Zeroes the optimistic tail of `values` above the `probability` percentile.
///
/// `probability` must lie strictly inside (0, 1). Elements equal to the
/// threshold are kept.
pub fn risk(values: &[f64], probability: f64) -> Result<Risked, VolError> {
    let percent = probability * 100.0;
    if !(percent > 0.0 && percent < 100.0) {
        return Err(VolError::InvalidProbabilityRange(
            ErrorInfo::new(
                "probability-out-of-range",
                format!("expected a probability strictly between 0 and 1, got {probability}"),
            )
            .with_context("probability", probability.to_string()),
        ));
    }

    let threshold = percentile(values, percent);
    let risked: Vec<f64> = values
        .iter()
        .map(|&x| if x > threshold { 0.0 } else { x })
        .collect();
    let zeroed = values.iter().filter(|&&x| x > threshold).count();
    debug!(probability, threshold, zeroed, "risking applied");

    Ok(Risked {
        threshold,
        stats: Stats::from_values(&risked),
        values: risked,
    })
}
