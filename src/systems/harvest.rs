use tracing::warn;

use crate::{
    engine::{System, SystemContext},
    notifications::Severity,
    rng::SystemId,
    systems::report,
    world::WorldState,
    yields::Resource,
};

/// Production, food consumption and the surplus pool.
///
/// Every non-food output goes straight into the stockpile. Food is netted against one unit
/// per inhabitant first; a shortfall drains the surplus pool and leaves the stockpile at zero.
pub struct HarvestSystem;

impl HarvestSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HarvestSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HarvestSystem {
    fn name(&self) -> &str {
        "harvest"
    }

    fn system_id(&self) -> SystemId {
        1
    }

    fn run(&self, ctx: &SystemContext<'_>, world: &mut WorldState) {
        let view = world.turn_view();
        let researched = view.researched;
        let notifications = view.notifications;
        for ledger in view.ledgers {
            let player_research = ledger.role.is_player().then_some(researched);
            let gross = ctx
                .rules
                .gross_yields(ledger.settlement, player_research, ledger.role);

            for (resource, amount) in gross.iter() {
                if resource != Resource::Food {
                    ledger.stockpile.add(resource, amount);
                }
            }

            let net_food = gross.get(Resource::Food) - f64::from(ledger.settlement.population);
            ledger.stockpile.add(Resource::Food, net_food);

            let food = ledger.stockpile.get(Resource::Food);
            if food < 0.0 {
                *ledger.food_surplus += food;
                ledger.stockpile.set(Resource::Food, 0.0);
                warn!(settlement = %ledger.settlement.id, shortfall = -food, "starvation");
                report(
                    notifications,
                    view.turn,
                    ledger.role,
                    "Disciples are starving! The food stockpile is depleted.".to_string(),
                    Severity::Warning,
                );
            } else if net_food > 0.0 {
                *ledger.food_surplus += net_food;
            }
            *ledger.food_surplus = ledger.food_surplus.max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        economy::Rules,
        rng::FixedRng,
        world::{DiplomaticStatus, Rival, Settlement},
        yields::YieldBundle,
    };

    fn world(rules: &Rules, population: u32, food: f64) -> WorldState {
        WorldState::new(
            Settlement::new("home", "Home", population, 20, &rules.tuning),
            YieldBundle::from([
                (Resource::Currency, 100.0),
                (Resource::Research, 5.0),
                (Resource::Food, food),
                (Resource::Production, 25.0),
            ]),
        )
    }

    fn run(rules: &Rules, world: &mut WorldState) {
        let rng = FixedRng::never();
        let ctx = SystemContext::new(world.turn, rules, &rng);
        HarvestSystem::new().run(&ctx, world);
    }

    #[test]
    fn balanced_food_leaves_stock_alone() {
        let rules = Rules::default();
        let mut world = world(&rules, 5, 20.0);
        run(&rules, &mut world);

        assert_eq!(world.stockpile.get(Resource::Food), 20.0);
        assert_eq!(world.stockpile.get(Resource::Currency), 102.0);
        assert_eq!(world.stockpile.get(Resource::Production), 28.0);
        assert_eq!(world.stockpile.get(Resource::Prestige), 0.5);
        assert_eq!(world.food_surplus, 0.0);
    }

    #[test]
    fn surplus_accumulates() {
        let rules = Rules::default();
        let mut world = world(&rules, 2, 20.0);
        world.food_surplus = 4.0;
        run(&rules, &mut world);

        assert_eq!(world.stockpile.get(Resource::Food), 23.0);
        assert_eq!(world.food_surplus, 7.0);
    }

    #[test]
    fn shortfall_drains_pool_and_floors_stock() {
        let rules = Rules::default();
        let mut world = world(&rules, 12, 3.0);
        world.food_surplus = 10.0;
        run(&rules, &mut world);

        // 3 + 5 - 12 = -4
        assert_eq!(world.stockpile.get(Resource::Food), 0.0);
        assert_eq!(world.food_surplus, 6.0);
        let last = world.notifications.last().expect("starvation notice");
        assert_eq!(last.severity, Severity::Warning);
    }

    #[test]
    fn pool_never_goes_negative() {
        let rules = Rules::default();
        let mut world = world(&rules, 40, 0.0);
        world.food_surplus = 5.0;
        run(&rules, &mut world);

        assert_eq!(world.food_surplus, 0.0);
        assert_eq!(world.stockpile.get(Resource::Food), 0.0);
    }

    #[test]
    fn rivals_use_their_own_stock_quietly() {
        let rules = Rules::default();
        let mut world = world(&rules, 5, 20.0).with_rival(Rival {
            settlement: Settlement::new("rival", "Rival", 10, 2, &rules.tuning),
            resources: YieldBundle::from([(Resource::Food, 2.0), (Resource::Currency, 50.0)]),
            food_surplus: 0.0,
            diplomacy: DiplomaticStatus::Peace,
        });
        run(&rules, &mut world);

        let rival = &world.rivals[0];
        assert_eq!(rival.resources.get(Resource::Food), 0.0);
        assert_eq!(rival.resources.get(Resource::Currency), 53.0);
        assert_eq!(rival.resources.get(Resource::Research), 1.0);
        assert!(world.notifications.is_empty());
        assert_eq!(world.stockpile.get(Resource::Currency), 102.0);
    }
}
