//! Production and cost rules derived from the catalog and tuning.

use std::collections::BTreeSet;

use crate::catalog::{Catalog, ResearchDefinition, ResearchId, StructureDefinition, StructureId};
use crate::config::Tuning;
use crate::world::{BuiltStructure, Role, Settlement, WorldState};
use crate::yields::YieldBundle;

#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub catalog: Catalog,
    pub tuning: Tuning,
}

impl Rules {
    pub fn new(catalog: Catalog, tuning: Tuning) -> Self {
        Self { catalog, tuning }
    }

    /// Per-turn output before consumption.
    ///
    /// Rivals only ever receive their base rate: structures and research bonuses count for
    /// the player alone, even though a rival settlement can hold structures.
    pub fn gross_yields(
        &self,
        settlement: &Settlement,
        researched: Option<&BTreeSet<ResearchId>>,
        role: Role,
    ) -> YieldBundle {
        let mut yields = match role {
            Role::Player => self.tuning.player_base_yields.clone(),
            Role::Rival => self.tuning.rival_base_yields.clone(),
        };
        if role == Role::Rival {
            return yields;
        }

        for built in &settlement.structures {
            let Some(def) = self.catalog.structure(&built.id) else {
                continue;
            };
            yields.merge(&def.base_yield.scaled(f64::from(built.tier)));
            if built.assigned_specialists > 0 {
                yields.merge(
                    &def.specialist_bonus
                        .scaled(f64::from(built.assigned_specialists)),
                );
            }
        }

        for id in researched.into_iter().flatten() {
            if let Some(def) = self.catalog.research(id) {
                yields.merge(&def.yield_bonus);
            }
        }
        yields
    }

    /// Price of moving `built` up one tier: the tier 1 cost times the tier being left.
    /// Empty when the structure is not in the catalog.
    pub fn structure_upgrade_cost(&self, built: &BuiltStructure) -> YieldBundle {
        self.catalog
            .structure(&built.id)
            .map(|def| def.cost.scaled(f64::from(built.tier)))
            .unwrap_or_default()
    }

    pub fn housing_upgrade_cost(&self, current_level: u32) -> YieldBundle {
        self.tuning
            .housing_base_cost
            .scaled(f64::from(current_level))
    }

    /// Display name from the catalog, falling back to the raw id.
    pub fn structure_name<'a>(&'a self, id: &'a StructureId) -> &'a str {
        self.catalog
            .structure(id)
            .map_or(id.as_str(), |def| def.name.as_str())
    }

    /// Structures the player could build now: not yet built, and unlocked if gated.
    pub fn available_structures<'a>(&'a self, world: &WorldState) -> Vec<&'a StructureDefinition> {
        self.catalog
            .structures()
            .iter()
            .filter(|def| !world.player.has_structure(&def.id))
            .filter(|def| {
                def.unlocked_by
                    .as_ref()
                    .map_or(true, |gate| world.is_researched(gate))
            })
            .collect()
    }

    /// Topics not yet researched whose prerequisites are all in place.
    pub fn available_research<'a>(&'a self, world: &WorldState) -> Vec<&'a ResearchDefinition> {
        self.catalog
            .research_topics()
            .iter()
            .filter(|def| !world.is_researched(&def.id))
            .filter(|def| self.catalog.prerequisites_met(&def.id, &world.researched))
            .collect()
    }
}
