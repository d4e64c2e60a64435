use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    rng::{RngExt, SystemId},
    world::WorldState,
};

/// Rival settlements near their housing cap sometimes pay to expand it. The player only
/// expands housing by command.
pub struct HousingSystem;

impl HousingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HousingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HousingSystem {
    fn name(&self) -> &str {
        "housing"
    }

    fn system_id(&self) -> SystemId {
        5
    }

    fn run(&self, ctx: &SystemContext<'_>, world: &mut WorldState) {
        let rules = ctx.rules;
        let view = world.turn_view();
        for ledger in view.ledgers.into_iter().filter(|l| !l.role.is_player()) {
            let settlement = ledger.settlement;
            let cost = rules.housing_upgrade_cost(settlement.housing_level);
            if !ledger.stockpile.covers(&cost) {
                continue;
            }
            if settlement.population + 1 < settlement.max_population {
                continue;
            }

            let mut rng = ctx.rng(self.system_id(), ledger.index);
            if !rng.chance(rules.tuning.rival_housing_chance) {
                continue;
            }
            ledger.stockpile.deduct(&cost);
            settlement.set_housing_level(settlement.housing_level + 1, &rules.tuning);
            debug!(
                settlement = %settlement.id,
                level = settlement.housing_level,
                max_population = settlement.max_population,
                "rival housing expanded"
            );
        }
    }
}
