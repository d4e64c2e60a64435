use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    notifications::Severity,
    rng::SystemId,
    systems::report,
    world::WorldState,
};

/// Converts the food surplus pool into new population, up to housing capacity.
///
/// Runs after the morale system; a settlement whose stored morale is at or below the low
/// threshold does not grow this turn.
pub struct GrowthSystem;

impl GrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GrowthSystem {
    fn name(&self) -> &str {
        "growth"
    }

    fn system_id(&self) -> SystemId {
        4
    }

    fn run(&self, ctx: &SystemContext<'_>, world: &mut WorldState) {
        let tuning = &ctx.rules.tuning;
        let per_pop = tuning.food_per_new_pop;
        if per_pop <= 0.0 {
            return;
        }

        let view = world.turn_view();
        let notifications = view.notifications;
        for ledger in view.ledgers {
            let settlement = ledger.settlement;
            if settlement.morale <= tuning.low_morale_threshold {
                continue;
            }
            if *ledger.food_surplus < per_pop || settlement.population >= settlement.max_population {
                continue;
            }

            let potential = (*ledger.food_surplus / per_pop).floor() as u32;
            let room = settlement.max_population - settlement.population;
            let actual = potential.min(room);
            if actual == 0 {
                continue;
            }

            settlement.population += actual;
            *ledger.food_surplus -= f64::from(actual) * per_pop;
            debug!(settlement = %settlement.id, added = actual, population = settlement.population, "growth");
            report(
                notifications,
                view.turn,
                ledger.role,
                format!("{actual} new disciple(s) joined your sect!"),
                Severity::Success,
            );
        }
    }
}
