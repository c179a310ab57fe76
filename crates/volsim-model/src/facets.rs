//! Read-only per-region views consumed by the result shaper.

use indexmap::IndexMap;
use volsim_dist::Distribution;
use volsim_prop::{Property, Stats};

use crate::region::Region;

/// Property classes a facet query can include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Include {
    /// Distribution-backed properties.
    Inputs,
    /// Equation-backed properties.
    Results,
}

impl Include {
    /// Both classes.
    pub const ALL: [Include; 2] = [Include::Inputs, Include::Results];

    fn admits(self, property: &Property) -> bool {
        match self {
            Include::Inputs => property.is_input(),
            Include::Results => property.is_result(),
        }
    }
}

/// What the export reads from one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyFacet<'a> {
    /// Sampled or evaluated values.
    pub values: &'a [f64],
    /// Statistics of `values`, absent before the property has run.
    pub stats: Option<&'a Stats>,
    /// Backing distribution, holding the sample set of its last draw; `None` for results.
    pub distribution: Option<&'a Distribution>,
}

/// What the export reads from one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFacets<'a> {
    /// Included properties by name, in region order.
    pub properties: IndexMap<&'a str, PropertyFacet<'a>>,
    /// Risked values of the region's risked result; empty when there is none.
    pub values_probability: &'a [f64],
    /// Statistics of `values_probability`.
    pub probability_stats: Option<&'a Stats>,
}

/// Anything that can hand out per-region property facets.
pub trait PropertyAggregator {
    /// Facets for every region, restricted to the `include` classes.
    fn region_facets(&self, include: &[Include]) -> IndexMap<&str, RegionFacets<'_>>;
}

impl Region {
    /// Facets of this region's properties in the `include` classes.
    pub fn facets(&self, include: &[Include]) -> RegionFacets<'_> {
        let properties = self
            .properties()
            .iter()
            .filter(|(_, property)| include.iter().any(|class| class.admits(property)))
            .map(|(name, property)| {
                let facet = PropertyFacet {
                    values: property.values(),
                    stats: property.stats(),
                    distribution: property.distribution(),
                };
                (name.as_str(), facet)
            })
            .collect();
        let risked = self.risked();
        RegionFacets {
            properties,
            values_probability: risked.map(Property::values_probability).unwrap_or_default(),
            probability_stats: risked.and_then(Property::probability_stats),
        }
    }
}
