//! The property entity and its calculation pass.

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::{Bindings, EquationEvaluator, RngHandle};
use volsim_dist::Distribution;
use volsim_eqn::ArrayEvaluator;

use crate::risk::risk;
use crate::stats::Stats;

/// What backs a property's values.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Sampled from a distribution.
    Input {
        /// Sampler producing the values.
        distribution: Distribution,
    },
    /// Derived from other properties by an equation.
    Result {
        /// Equation text over other properties' variables.
        equation: String,
    },
}

impl PropertyKind {
    /// Lower-case label used in the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyKind::Input { .. } => "input",
            PropertyKind::Result { .. } => "result",
        }
    }
}

/// A uniquely named Monte Carlo quantity within a region.
///
/// Values, statistics and the risked outcome are empty until
/// [`Property::run_calculation`] populates them. Equality and hashing use the
/// name only.
#[derive(Debug, Clone)]
pub struct Property {
    pub(crate) name: String,
    pub(crate) variable: String,
    pub(crate) kind: PropertyKind,
    pub(crate) values: Vec<f64>,
    pub(crate) stats: Option<Stats>,
    pub(crate) probability: Option<f64>,
    pub(crate) values_probability: Vec<f64>,
    pub(crate) probability_stats: Option<Stats>,
}

impl Property {
    fn with_kind(name: impl Into<String>, variable: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            variable: variable.into(),
            kind,
            values: Vec::new(),
            stats: None,
            probability: None,
            values_probability: Vec::new(),
            probability_stats: None,
        }
    }

    /// Creates an input property sampled from `distribution`.
    pub fn input(
        name: impl Into<String>,
        variable: impl Into<String>,
        distribution: Distribution,
    ) -> Self {
        Self::with_kind(name, variable, PropertyKind::Input { distribution })
    }

    /// Creates a result property derived from `equation`.
    pub fn result(
        name: impl Into<String>,
        variable: impl Into<String>,
        equation: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name,
            variable,
            PropertyKind::Result {
                equation: equation.into(),
            },
        )
    }

    /// Creates a property from optional backings; exactly one must be given.
    ///
    /// An empty equation string counts as absent.
    pub fn from_parts(
        name: impl Into<String>,
        variable: impl Into<String>,
        distribution: Option<Distribution>,
        equation: Option<String>,
    ) -> Result<Self, VolError> {
        let name = name.into();
        let equation = equation.filter(|text| !text.trim().is_empty());
        let kind = match (distribution, equation) {
            (Some(distribution), None) => PropertyKind::Input { distribution },
            (None, Some(equation)) => PropertyKind::Result { equation },
            (Some(_), Some(_)) => {
                return Err(VolError::InvalidPropertyDefinition(
                    ErrorInfo::new(
                        "both-backings",
                        "a property takes a distribution or an equation, not both",
                    )
                    .with_context("property", name),
                ))
            }
            (None, None) => {
                return Err(VolError::InvalidPropertyDefinition(
                    ErrorInfo::new(
                        "no-backing",
                        "a property needs either a distribution or an equation",
                    )
                    .with_context("property", name),
                ))
            }
        };
        Ok(Self::with_kind(name, variable, kind))
    }

    /// Sets the risking probability; it is validated when risking runs.
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Seeds the risked statistics, e.g. from a persisted run.
    pub fn with_probability_stats(mut self, stats: Stats) -> Self {
        self.probability_stats = Some(stats);
        self
    }

    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier other equations use to reference this property.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Backing kind.
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// True for distribution-backed properties.
    pub fn is_input(&self) -> bool {
        matches!(self.kind, PropertyKind::Input { .. })
    }

    /// True for equation-backed properties.
    pub fn is_result(&self) -> bool {
        matches!(self.kind, PropertyKind::Result { .. })
    }

    /// Backing distribution of an input property.
    pub fn distribution(&self) -> Option<&Distribution> {
        match &self.kind {
            PropertyKind::Input { distribution } => Some(distribution),
            PropertyKind::Result { .. } => None,
        }
    }

    /// Mutable backing distribution of an input property.
    pub fn distribution_mut(&mut self) -> Option<&mut Distribution> {
        match &mut self.kind {
            PropertyKind::Input { distribution } => Some(distribution),
            PropertyKind::Result { .. } => None,
        }
    }

    /// Equation text of a result property.
    pub fn equation(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Input { .. } => None,
            PropertyKind::Result { equation } => Some(equation),
        }
    }

    /// Sampled or evaluated values; empty before the first calculation.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Statistics of [`Property::values`].
    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    /// Risking probability, if configured.
    pub fn probability(&self) -> Option<f64> {
        self.probability
    }

    /// Risked values; empty unless a result property with a probability has run.
    pub fn values_probability(&self) -> &[f64] {
        &self.values_probability
    }

    /// Statistics of [`Property::values_probability`].
    pub fn probability_stats(&self) -> Option<&Stats> {
        self.probability_stats.as_ref()
    }

    /// True when this is a result property carrying a risking probability.
    pub fn is_risked(&self) -> bool {
        self.is_result() && self.probability.is_some()
    }

    /// Forgets the results of the last calculation.
    ///
    /// Risked statistics seeded onto a property that is not risked are kept,
    /// as a calculation would keep them.
    pub fn clear_results(&mut self) {
        self.values.clear();
        self.stats = None;
        self.values_probability.clear();
        if self.is_risked() {
            self.probability_stats = None;
        }
    }

    /// Samples or evaluates this property with the default evaluator.
    pub fn run_calculation(&mut self, bindings: &Bindings) -> Result<&Stats, VolError> {
        self.run_calculation_with(bindings, &ArrayEvaluator, None)
    }

    /// Samples or evaluates this property, risks it when configured, and
    /// recomputes statistics.
    ///
    /// Input properties ignore `bindings` and `evaluator`; result properties
    /// ignore `rng`. State is only replaced once every step has succeeded.
    pub fn run_calculation_with(
        &mut self,
        bindings: &Bindings,
        evaluator: &dyn EquationEvaluator,
        rng: Option<&mut RngHandle>,
    ) -> Result<&Stats, VolError> {
        let values = match &mut self.kind {
            PropertyKind::Input { distribution } => distribution.draw(rng)?,
            PropertyKind::Result { equation } => evaluator.evaluate(equation, bindings)?,
        };

        let (values_probability, probability_stats) = match (&self.kind, self.probability) {
            (PropertyKind::Result { .. }, Some(probability)) => {
                let risked = risk(&values, probability)?;
                (risked.values, Some(risked.stats))
            }
            _ => (Vec::new(), self.probability_stats),
        };

        let stats = Stats::from_values(&values);
        debug!(
            property = %self.name,
            kind = self.kind.label(),
            samples = values.len(),
            mean = stats.mean,
            "property calculated"
        );
        self.values = values;
        self.values_probability = values_probability;
        self.probability_stats = probability_stats;
        Ok(self.stats.insert(stats))
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Property {}

impl Hash for Property {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} PROPERTY {}",
            self.kind.label().to_uppercase(),
            self.name
        )?;
        match &self.kind {
            PropertyKind::Input { distribution } => {
                writeln!(f, "* Distribution:\n{}", distribution.name())?
            }
            PropertyKind::Result { equation } => writeln!(f, "* Equation:\n{equation}")?,
        }
        match &self.stats {
            Some(stats) => writeln!(f, "* Stats: {stats}")?,
            None => writeln!(f, "* Stats: {{}}")?,
        }
        write!(f, "* probability: {}", self.probability.unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volsim_dist::Family;

    fn area() -> Property {
        let dist = Distribution::new(Family::Uniform { min: 100.0, max: 200.0 }, 16)
            .unwrap()
            .with_seed(3);
        Property::input("Area", "area", dist)
    }

    #[test]
    fn both_or_neither_backing_is_rejected() {
        let dist = Distribution::new(Family::Constant { value: 1.0 }, 4).unwrap();
        let err = Property::from_parts("x", "x", Some(dist), Some("a".into())).unwrap_err();
        assert!(matches!(err, VolError::InvalidPropertyDefinition(_)));
        let err = Property::from_parts("x", "x", None, Some("  ".into())).unwrap_err();
        assert_eq!(err.info().code, "no-backing");
    }

    #[test]
    fn equality_uses_name_only() {
        let a = Property::result("Same", "a", "1");
        let b = Property::result("Same", "b", "2");
        assert_eq!(a, b);
        assert_ne!(a, Property::result("Other", "a", "1"));
    }

    #[test]
    fn failed_risking_leaves_state_untouched() {
        let mut prop = Property::result("Bad", "bad", "1 + 1").with_probability(1.0);
        assert!(prop.run_calculation(&Bindings::new()).is_err());
        assert!(prop.values().is_empty());
        assert!(prop.stats().is_none());
    }

    #[test]
    fn display_names_kind_and_backing() {
        let mut prop = area();
        prop.run_calculation(&Bindings::new()).unwrap();
        let text = prop.to_string();
        assert!(text.starts_with("INPUT PROPERTY Area\n* Distribution:\nuniform\n"));
        assert!(text.ends_with("* probability: 0"));
    }
}
