//! Percentiles and summary statistics over sample arrays.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Summary statistics of a sample array.
///
/// Percentiles are in raw statistical order: `p10` is the low value. The
/// exceedance relabeling used in reserves reporting happens at export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// 10th percentile.
    #[serde(rename = "P10", deserialize_with = "f64_or_nan")]
    pub p10: f64,
    /// Median.
    #[serde(rename = "P50", deserialize_with = "f64_or_nan")]
    pub p50: f64,
    /// 90th percentile.
    #[serde(rename = "P90", deserialize_with = "f64_or_nan")]
    pub p90: f64,
    /// Arithmetic mean.
    #[serde(rename = "Mean", deserialize_with = "f64_or_nan")]
    pub mean: f64,
    /// Population standard deviation.
    #[serde(rename = "Std", deserialize_with = "f64_or_nan")]
    pub std: f64,
}

// serde_json writes non-finite floats as null
fn f64_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Stats {
    /// Computes the statistic set; every entry is NaN for an empty or NaN-bearing array.
    pub fn from_values(values: &[f64]) -> Self {
        let [p10, p50, p90] = percentiles(values, [10.0, 50.0, 90.0]);
        Self {
            p10,
            p50,
            p90,
            mean: mean(values),
            std: std_dev(values),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{P10: {}, P50: {}, P90: {}, Mean: {}, Std: {}}}",
            self.p10, self.p50, self.p90, self.mean, self.std
        )
    }
}

/// Arithmetic mean; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`); NaN when empty.
pub fn std_dev(values: &[f64]) -> f64 {
    let mu = mean(values);
    if mu.is_nan() {
        return f64::NAN;
    }
    let var = values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Percentile `q` (in percent, `0..=100`) with median-unbiased interpolation.
///
/// Uses the Hyndman–Fan type 8 plotting position, `h = n·p + (p + 1)/3 - 1`
/// with `p = q/100`, clamped to the sample range and linearly interpolated.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let [value] = percentiles(values, [q]);
    value
}

/// Several percentiles from one sort.
pub fn percentiles<const K: usize>(values: &[f64], qs: [f64; K]) -> [f64; K] {
    if values.is_empty() || values.iter().any(|x| x.is_nan()) {
        return [f64::NAN; K];
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    qs.map(|q| interpolate(&sorted, q / 100.0))
}

fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let h = n as f64 * p + (p + 1.0) / 3.0 - 1.0;
    if h <= 0.0 {
        return sorted[0];
    }
    if h >= (n - 1) as f64 {
        return sorted[n - 1];
    }
    let lo = h.floor();
    let gamma = h - lo;
    let lo = lo as usize;
    sorted[lo] + gamma * (sorted[lo + 1] - sorted[lo])
}
