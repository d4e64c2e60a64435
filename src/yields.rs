//! Resource kinds and the additive yield ledger shared by stockpiles, costs and outputs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Food,
    Production,
    Currency,
    Research,
    Prestige,
    Faith,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Food,
        Resource::Production,
        Resource::Currency,
        Resource::Research,
        Resource::Prestige,
        Resource::Faith,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Resource::Food => "Food",
            Resource::Production => "Production",
            Resource::Currency => "Currency",
            Resource::Research => "Research",
            Resource::Prestige => "Prestige",
            Resource::Faith => "Faith",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quantities keyed by resource kind.
///
/// A kind that is absent reads as zero. Presence still matters for costs: affordability is
/// checked only for the kinds a cost actually names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YieldBundle {
    amounts: BTreeMap<Resource, f64>,
}

impl YieldBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: Resource) -> f64 {
        self.amounts.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, resource: Resource, amount: f64) {
        self.amounts.insert(resource, amount);
    }

    pub fn add(&mut self, resource: Resource, amount: f64) {
        *self.amounts.entry(resource).or_insert(0.0) += amount;
    }

    pub fn contains(&self, resource: Resource) -> bool {
        self.amounts.contains_key(&resource)
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, f64)> + '_ {
        self.amounts.iter().map(|(resource, amount)| (*resource, *amount))
    }

    /// Adds every entry of `other` into this bundle.
    pub fn merge(&mut self, other: &YieldBundle) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    /// Returns a copy with every entry multiplied by `factor`; the set of kinds is unchanged.
    pub fn scaled(&self, factor: f64) -> YieldBundle {
        self.iter()
            .map(|(resource, amount)| (resource, amount * factor))
            .collect()
    }

    /// True when every kind named in `cost` is available in at least that quantity.
    pub fn covers(&self, cost: &YieldBundle) -> bool {
        cost.iter()
            .all(|(resource, required)| self.get(resource) >= required)
    }

    /// Subtracts `cost` entry by entry. Callers check [`YieldBundle::covers`] first.
    pub fn deduct(&mut self, cost: &YieldBundle) {
        for (resource, amount) in cost.iter() {
            self.add(resource, -amount);
        }
    }
}

impl FromIterator<(Resource, f64)> for YieldBundle {
    fn from_iter<I: IntoIterator<Item = (Resource, f64)>>(iter: I) -> Self {
        let mut bundle = YieldBundle::new();
        for (resource, amount) in iter {
            bundle.add(resource, amount);
        }
        bundle
    }
}

impl<const N: usize> From<[(Resource, f64); N]> for YieldBundle {
    fn from(entries: [(Resource, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Display for YieldBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (resource, amount) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{amount} {resource}")?;
        }
        Ok(())
    }
}
