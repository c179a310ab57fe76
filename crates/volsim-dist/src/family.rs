//! Distribution families and their samplers.
//!
//! | family | parameters | support |
//! |---|---|---|
//! | `uniform` | min, max | [min, max) |
//! | `triangular` | min, mode, max | [min, max] |
//! | `normal` | mean, std | ℝ |
//! | `lognormal` | mu, sigma (of ln X) | (0, ∞) |
//! | `truncnormal` | mean, std, min, max | [min, max] |
//! | `constant` | value | {value} |

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rand::Rng;
use volsim_core::errors::{ErrorInfo, VolError};

/// Attempts per sample before truncated-normal rejection gives up.
const MAX_REJECTIONS: usize = 10_000;

/// Parametric family a [`crate::Distribution`] draws from.
#[derive(Debug, Clone, PartialEq)]
pub enum Family {
    /// Continuous uniform on `[min, max)`.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Triangular with a peak at `mode`.
    Triangular {
        /// Lower bound.
        min: f64,
        /// Most likely value.
        mode: f64,
        /// Upper bound.
        max: f64,
    },
    /// Gaussian N(mean, std²).
    Normal {
        /// Location.
        mean: f64,
        /// Scale, strictly positive.
        std: f64,
    },
    /// Log-normal where ln X ~ N(mu, sigma²).
    LogNormal {
        /// Mean of ln X.
        mu: f64,
        /// Standard deviation of ln X.
        sigma: f64,
    },
    /// Gaussian restricted to `[min, max]`.
    TruncNormal {
        /// Location of the parent normal.
        mean: f64,
        /// Scale of the parent normal.
        std: f64,
        /// Lower truncation bound.
        min: f64,
        /// Upper truncation bound.
        max: f64,
    },
    /// Degenerate distribution returning a fixed value.
    Constant {
        /// The value every sample takes.
        value: f64,
    },
}

fn invalid(family: &str, message: String) -> VolError {
    VolError::Distribution(
        ErrorInfo::new("invalid-parameters", message).with_context("family", family),
    )
}

fn require(params: &BTreeMap<String, f64>, family: &str, key: &str) -> Result<f64, VolError> {
    let value = params.get(key).copied().ok_or_else(|| {
        VolError::Distribution(
            ErrorInfo::new("missing-parameter", format!("{family} requires `{key}`"))
                .with_context("family", family)
                .with_context("parameter", key),
        )
    })?;
    if !value.is_finite() {
        return Err(invalid(family, format!("`{key}` must be finite, got {value}")));
    }
    Ok(value)
}

impl Family {
    /// Builds a family from its name and named parameters, validating constraints.
    pub fn from_parts(name: &str, params: &BTreeMap<String, f64>) -> Result<Self, VolError> {
        let family = match name.to_ascii_lowercase().as_str() {
            "uniform" => Family::Uniform {
                min: require(params, name, "min")?,
                max: require(params, name, "max")?,
            },
            "triangular" => Family::Triangular {
                min: require(params, name, "min")?,
                mode: require(params, name, "mode")?,
                max: require(params, name, "max")?,
            },
            "normal" => Family::Normal {
                mean: require(params, name, "mean")?,
                std: require(params, name, "std")?,
            },
            "lognormal" | "log-normal" => Family::LogNormal {
                mu: require(params, name, "mu")?,
                sigma: require(params, name, "sigma")?,
            },
            "truncnormal" | "truncated-normal" => Family::TruncNormal {
                mean: require(params, name, "mean")?,
                std: require(params, name, "std")?,
                min: require(params, name, "min")?,
                max: require(params, name, "max")?,
            },
            "constant" => Family::Constant {
                value: require(params, name, "value")?,
            },
            other => {
                return Err(VolError::Distribution(
                    ErrorInfo::new("unknown-family", format!("unknown distribution `{other}`"))
                        .with_hint(
                            "expected one of uniform, triangular, normal, lognormal, truncnormal, constant",
                        ),
                ))
            }
        };
        family.validate()?;
        Ok(family)
    }

    /// Canonical family name used in the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Uniform { .. } => "uniform",
            Family::Triangular { .. } => "triangular",
            Family::Normal { .. } => "normal",
            Family::LogNormal { .. } => "lognormal",
            Family::TruncNormal { .. } => "truncnormal",
            Family::Constant { .. } => "constant",
        }
    }

    /// Named parameters in the serialized form.
    pub fn parameters(&self) -> BTreeMap<String, f64> {
        let pairs: Vec<(&str, f64)> = match *self {
            Family::Uniform { min, max } => vec![("min", min), ("max", max)],
            Family::Triangular { min, mode, max } => {
                vec![("min", min), ("mode", mode), ("max", max)]
            }
            Family::Normal { mean, std } => vec![("mean", mean), ("std", std)],
            Family::LogNormal { mu, sigma } => vec![("mu", mu), ("sigma", sigma)],
            Family::TruncNormal {
                mean,
                std,
                min,
                max,
            } => vec![("mean", mean), ("std", std), ("min", min), ("max", max)],
            Family::Constant { value } => vec![("value", value)],
        };
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    /// Checks the family constraints.
    pub fn validate(&self) -> Result<(), VolError> {
        let name = self.name();
        match *self {
            Family::Uniform { min, max } if min >= max => Err(invalid(
                name,
                format!("uniform requires min < max, got min={min}, max={max}"),
            )),
            Family::Triangular { min, mode, max } if min > mode || mode > max || min >= max => {
                Err(invalid(
                    name,
                    format!(
                        "triangular requires min ≤ mode ≤ max and min < max, got {min}, {mode}, {max}"
                    ),
                ))
            }
            Family::Normal { std, .. } if std <= 0.0 => {
                Err(invalid(name, format!("normal requires std > 0, got {std}")))
            }
            Family::LogNormal { sigma, .. } if sigma <= 0.0 => Err(invalid(
                name,
                format!("lognormal requires sigma > 0, got {sigma}"),
            )),
            Family::TruncNormal { std, min, max, .. } if std <= 0.0 || min >= max => Err(invalid(
                name,
                format!("truncnormal requires std > 0 and min < max, got std={std}, min={min}, max={max}"),
            )),
            _ => Ok(()),
        }
    }

    /// Draws `n` independent samples.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Result<Vec<f64>, VolError> {
        let mut out = Vec::with_capacity(n);
        match *self {
            Family::Uniform { min, max } => {
                out.extend((0..n).map(|_| min + (max - min) * rng.gen::<f64>()));
            }
            Family::Triangular { min, mode, max } => {
                let split = (mode - min) / (max - min);
                out.extend((0..n).map(|_| {
                    let u = rng.gen::<f64>();
                    if u < split {
                        min + (u * (max - min) * (mode - min)).sqrt()
                    } else {
                        max - ((1.0 - u) * (max - min) * (max - mode)).sqrt()
                    }
                }));
            }
            Family::Normal { mean, std } => {
                out.extend((0..n).map(|_| mean + std * standard_normal(rng)));
            }
            Family::LogNormal { mu, sigma } => {
                out.extend((0..n).map(|_| (mu + sigma * standard_normal(rng)).exp()));
            }
            Family::TruncNormal {
                mean,
                std,
                min,
                max,
            } => {
                for _ in 0..n {
                    out.push(truncated_normal(rng, mean, std, min, max)?);
                }
            }
            Family::Constant { value } => out.resize(n, value),
        }
        Ok(out)
    }
}

/// Box-Muller transform; `1 - u` keeps the logarithm argument in (0, 1].
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn truncated_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
) -> Result<f64, VolError> {
    for _ in 0..MAX_REJECTIONS {
        let candidate = mean + std * standard_normal(rng);
        if (min..=max).contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(VolError::Distribution(
        ErrorInfo::new(
            "truncnormal-rejection",
            "truncation window holds too little probability mass to sample",
        )
        .with_context("mean", mean.to_string())
        .with_context("std", std.to_string())
        .with_context("min", min.to_string())
        .with_context("max", max.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use volsim_core::RngHandle;

    fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn parameters_round_trip_through_from_parts() {
        let family = Family::Triangular {
            min: 1.0,
            mode: 2.0,
            max: 4.0,
        };
        let rebuilt = Family::from_parts(family.name(), &family.parameters()).unwrap();
        assert_eq!(rebuilt, family);
    }

    #[test]
    fn missing_parameter_is_reported() {
        let err = Family::from_parts("normal", &params(&[("mean", 0.0)])).unwrap_err();
        assert_eq!(err.info().code, "missing-parameter");
        assert_eq!(err.info().context["parameter"], "std");
    }

    #[test]
    fn unknown_family_is_rejected() {
        let err = Family::from_parts("cauchy", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, VolError::Distribution(_)));
        assert_eq!(err.info().code, "unknown-family");
    }

    #[test]
    fn standard_normal_moments_are_plausible() {
        let mut rng = RngHandle::from_seed(11);
        let draws: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
