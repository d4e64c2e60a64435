mod growth;
mod harvest;
mod housing;
mod morale;
mod specialists;

pub use growth::GrowthSystem;
pub use harvest::HarvestSystem;
pub use housing::HousingSystem;
pub use morale::MoraleSystem;
pub use specialists::SpecialistSystem;

use crate::notifications::{NotificationLog, Severity};
use crate::world::Role;

/// Records a turn event for the player; rival events stay private.
fn report(log: &mut NotificationLog, turn: u32, role: Role, message: String, severity: Severity) {
    if role.is_player() {
        log.push(message, severity, turn);
    }
}
