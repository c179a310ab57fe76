//! A region: properties sharing one Monte Carlo sample set.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use tracing::{debug, info};
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::{derive_substream_seed, Bindings, EquationEvaluator, RngHandle};
use volsim_eqn::{is_constant, ArrayEvaluator};
use volsim_prop::Property;

/// Named group of properties evaluated together in dependency order.
#[derive(Debug, Clone, Default)]
pub struct Region {
    name: String,
    properties: IndexMap<String, Property>,
    risked: Option<String>,
}

impl Region {
    /// Creates an empty region.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            risked: None,
        }
    }

    /// Creates a region holding `properties`, in order.
    pub fn with_properties(
        name: impl Into<String>,
        properties: impl IntoIterator<Item = Property>,
    ) -> Result<Self, VolError> {
        let mut region = Self::new(name);
        for property in properties {
            region.add_property(property)?;
        }
        Ok(region)
    }

    /// Adds a property; names and variables must be unique within the region.
    pub fn add_property(&mut self, property: Property) -> Result<(), VolError> {
        if self.properties.contains_key(property.name()) {
            return Err(VolError::InvalidPropertyDefinition(
                ErrorInfo::new("duplicate-name", "property names must be unique in a region")
                    .with_context("region", self.name.as_str())
                    .with_context("property", property.name()),
            ));
        }
        if let Some(clash) = self
            .properties
            .values()
            .find(|existing| existing.variable() == property.variable())
        {
            return Err(VolError::InvalidPropertyDefinition(
                ErrorInfo::new("duplicate-variable", "property variables must be unique in a region")
                    .with_context("region", self.name.as_str())
                    .with_context("variable", property.variable())
                    .with_context("existing", clash.name()),
            ));
        }
        self.properties
            .insert(property.name().to_string(), property);
        Ok(())
    }

    /// Region name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> &IndexMap<String, Property> {
        &self.properties
    }

    /// Looks a property up by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Mutable lookup by name.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    /// The risked result of the last pass: the last result in evaluation
    /// order that carries a probability.
    pub fn risked(&self) -> Option<&Property> {
        self.risked
            .as_deref()
            .and_then(|name| self.properties.get(name))
    }

    /// Property names in an order where every result follows the properties
    /// its equation reads.
    pub fn evaluation_order(&self) -> Result<Vec<&str>, VolError> {
        let order = self.order_with(&ArrayEvaluator)?;
        Ok(order
            .into_iter()
            .filter_map(|idx| self.properties.get_index(idx).map(|(name, _)| name.as_str()))
            .collect())
    }

    /// Kahn's algorithm over property indices; ties resolve in insertion order.
    fn order_with(&self, evaluator: &dyn EquationEvaluator) -> Result<Vec<usize>, VolError> {
        let by_variable: HashMap<&str, usize> = self
            .properties
            .values()
            .enumerate()
            .map(|(idx, property)| (property.variable(), idx))
            .collect();

        let count = self.properties.len();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];

        for (idx, property) in self.properties.values().enumerate() {
            let Some(equation) = property.equation() else {
                continue;
            };
            let variables = evaluator
                .variables(equation)
                .map_err(|err| err.with_context("region", self.name.as_str()))?;
            for variable in variables {
                match by_variable.get(variable.as_str()) {
                    Some(&dep) => {
                        dependents[dep].push(idx);
                        in_degree[idx] += 1;
                    }
                    None if is_constant(&variable) => {}
                    None => {
                        return Err(VolError::Dependency(
                            ErrorInfo::new(
                                "unresolved-variable",
                                format!("`{variable}` is not defined by any property"),
                            )
                            .with_context("region", self.name.as_str())
                            .with_context("property", property.name())
                            .with_context("variable", variable),
                        ))
                    }
                }
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&idx| in_degree[idx] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(idx) = ready.pop_first() {
            order.push(idx);
            for &next in &dependents[idx] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        if order.len() < count {
            let stuck: Vec<&str> = self
                .properties
                .keys()
                .enumerate()
                .filter(|(idx, _)| in_degree[*idx] > 0)
                .map(|(_, name)| name.as_str())
                .collect();
            return Err(VolError::Dependency(
                ErrorInfo::new("cycle", "property equations depend on each other in a loop")
                    .with_context("region", self.name.as_str())
                    .with_context("properties", stuck.join(", ")),
            ));
        }
        Ok(order)
    }

    /// Runs every property with the default evaluator.
    pub fn run(&mut self, num_samples: usize, seed: Option<u64>) -> Result<(), VolError> {
        self.run_with(num_samples, seed, &ArrayEvaluator)
    }

    /// Runs every property in dependency order with `num_samples` trials.
    ///
    /// With a seed, property `i` (insertion index) draws from substream
    /// `derive_substream_seed(seed, i)`. The pass works on a staged copy that
    /// replaces the properties only once every property has succeeded; a
    /// failure clears the region's results instead, so nothing half-run can
    /// be exported.
    pub fn run_with(
        &mut self,
        num_samples: usize,
        seed: Option<u64>,
        evaluator: &dyn EquationEvaluator,
    ) -> Result<(), VolError> {
        let mut staged = self.properties.clone();
        let risked = match self.evaluate_into(&mut staged, num_samples, seed, evaluator) {
            Ok(risked) => risked,
            Err(err) => {
                self.clear_results();
                return Err(err);
            }
        };

        self.properties = staged;
        self.risked = risked;
        info!(
            region = %self.name,
            properties = self.properties.len(),
            samples = num_samples,
            risked = self.risked.as_deref().unwrap_or("-"),
            "region evaluated"
        );
        Ok(())
    }

    /// Drops every property's results and the risked facet.
    pub fn clear_results(&mut self) {
        for property in self.properties.values_mut() {
            property.clear_results();
        }
        self.risked = None;
    }

    fn evaluate_into(
        &self,
        staged: &mut IndexMap<String, Property>,
        num_samples: usize,
        seed: Option<u64>,
        evaluator: &dyn EquationEvaluator,
    ) -> Result<Option<String>, VolError> {
        let order = self.order_with(evaluator)?;
        let region = self.name.as_str();
        let mut bindings = Bindings::new();
        let mut risked = None;

        for idx in order {
            let Some((name, property)) = staged.get_index_mut(idx) else {
                continue;
            };
            let locate = |err: VolError| {
                err.with_context("region", region)
                    .with_context("property", name.as_str())
            };

            if let Some(distribution) = property.distribution_mut() {
                distribution.set_num_samples(num_samples).map_err(locate)?;
            }
            let mut rng = seed.map(|seed| RngHandle::from_seed(derive_substream_seed(seed, idx as u64)));
            property
                .run_calculation_with(&bindings, evaluator, rng.as_mut())
                .map_err(locate)?;

            if property.values().len() != num_samples {
                return Err(locate(VolError::InvalidInput(
                    ErrorInfo::new(
                        "sample-count-mismatch",
                        "property produced a different number of samples than the region",
                    )
                    .with_context("expected", num_samples.to_string())
                    .with_context("actual", property.values().len().to_string())
                    .with_hint("an equation without variables needs an earlier property to size it"),
                )));
            }
            debug!(region, property = %name, "property evaluated");

            if property.is_risked() {
                risked = Some(name.clone());
            }
            bindings.insert(property.variable().to_string(), property.values().to_vec());
        }
        Ok(risked)
    }
}
