use tracing::warn;

use crate::{
    engine::{System, SystemContext},
    notifications::Severity,
    rng::{RngExt, SystemId},
    systems::report,
    world::WorldState,
};

/// Recomputes morale from population and applies the low-morale penalties.
///
/// At or below the low threshold growth stops for the turn (enforced by the growth system,
/// which reads the morale stored here). At or below the critical threshold the settlement may
/// lose one inhabitant, but never its last.
pub struct MoraleSystem;

impl MoraleSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MoraleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MoraleSystem {
    fn name(&self) -> &str {
        "morale"
    }

    fn system_id(&self) -> SystemId {
        2
    }

    fn run(&self, ctx: &SystemContext<'_>, world: &mut WorldState) {
        let tuning = &ctx.rules.tuning;
        let view = world.turn_view();
        let notifications = view.notifications;
        for ledger in view.ledgers {
            let settlement = ledger.settlement;
            settlement.morale = tuning.morale_for(settlement.population);
            let morale = settlement.morale;

            if morale <= tuning.low_morale_threshold {
                report(
                    notifications,
                    view.turn,
                    ledger.role,
                    format!("Morale is low ({morale}%)! Growth halted."),
                    Severity::Warning,
                );
            }
            if morale <= tuning.critical_morale_threshold {
                report(
                    notifications,
                    view.turn,
                    ledger.role,
                    format!("Morale critical ({morale}%)! Risk of losing disciples."),
                    Severity::Error,
                );
                let mut rng = ctx.rng(self.system_id(), ledger.index);
                if rng.chance(tuning.population_loss_chance) && settlement.population > 1 {
                    settlement.population -= 1;
                    warn!(settlement = %settlement.id, population = settlement.population, "population lost to critical morale");
                    report(
                        notifications,
                        view.turn,
                        ledger.role,
                        "A disciple left the sect due to critical morale!".to_string(),
                        Severity::Error,
                    );
                }
            }
        }
    }
}
