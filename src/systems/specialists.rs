use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    notifications::Severity,
    rng::SystemId,
    systems::report,
    world::WorldState,
};

/// Keeps specialist assignments within slot capacity and within the population.
///
/// Withdrawals take from the most recently built structure that still has someone assigned,
/// one specialist at a time.
pub struct SpecialistSystem;

impl SpecialistSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpecialistSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SpecialistSystem {
    fn name(&self) -> &str {
        "specialists"
    }

    fn system_id(&self) -> SystemId {
        3
    }

    fn run(&self, ctx: &SystemContext<'_>, world: &mut WorldState) {
        let rules = ctx.rules;
        let view = world.turn_view();
        let notifications = view.notifications;
        for ledger in view.ledgers {
            let settlement = ledger.settlement;

            for built in &mut settlement.structures {
                let capacity = rules
                    .catalog
                    .structure(&built.id)
                    .map_or(0, |def| def.capacity_at(built.tier));
                built.assigned_specialists = built.assigned_specialists.min(capacity);
            }

            while settlement.total_specialists() > settlement.population {
                let Some(built) = settlement
                    .structures
                    .iter_mut()
                    .rev()
                    .find(|built| built.assigned_specialists > 0)
                else {
                    break;
                };
                built.assigned_specialists -= 1;
                debug!(settlement = %settlement.id, structure = %built.id, "specialist withdrawn");
                report(
                    notifications,
                    view.turn,
                    ledger.role,
                    format!(
                        "A specialist was withdrawn from {}.",
                        rules.structure_name(&built.id)
                    ),
                    Severity::Warning,
                );
            }
        }
    }
}
