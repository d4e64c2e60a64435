//! Player commands and the validation that guards them.
//!
//! Every command is checked in full before anything is written, so a rejected command never
//! leaves a partial deduction behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{ResearchId, StructureId};
use crate::economy::Rules;
use crate::notifications::{NotificationId, Severity};
use crate::world::{BuiltStructure, DiplomaticStatus, SettlementId, WorldState};
use crate::yields::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    BuildStructure { structure: StructureId },
    UpgradeStructure { structure: StructureId },
    UpgradeHousing,
    AssignSpecialist { structure: StructureId },
    UnassignSpecialist { structure: StructureId },
    ResearchTopic { research: ResearchId },
    DeclareWar { rival: SettlementId },
    MakePeace { rival: SettlementId },
    AdvanceTurn,
    DismissNotification { id: NotificationId },
    PostNotification { message: String, severity: Severity },
}

/// Why a command was refused. The display text is what the player is shown.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Unknown structure `{0}`.")]
    UnknownStructure(StructureId),
    #[error("{0} is already built.")]
    AlreadyBuilt(String),
    #[error("{name} requires {research} first.")]
    Locked { name: String, research: String },
    #[error("Not enough resources to build {0}.")]
    CannotAffordBuild(String),
    #[error("{0} has not been built yet.")]
    NotBuilt(String),
    #[error("{0} is already at max tier.")]
    MaxTier(String),
    #[error("Not enough resources to upgrade {name} to Tier {tier}.")]
    CannotAffordUpgrade { name: String, tier: u32 },
    #[error("Not enough resources to expand housing.")]
    CannotAffordHousing,
    #[error("No unassigned disciples available to assign as specialist.")]
    NoFreePopulation,
    #[error("{0} has no available specialist slots at its current tier.")]
    SlotsFull(String),
    #[error("No specialists to unassign from {0}.")]
    NothingToUnassign(String),
    #[error("Unknown research topic `{0}`.")]
    UnknownResearch(ResearchId),
    #[error("{0} is already researched.")]
    AlreadyResearched(String),
    #[error("{name} requires {missing} first.")]
    MissingPrerequisite { name: String, missing: String },
    #[error("Not enough Research to research {0}.")]
    CannotAffordResearch(String),
    #[error("Unknown rival sect `{0}`.")]
    UnknownRival(SettlementId),
}

impl Rejection {
    /// Refusals that only restate the current situation are `Info`; the rest are `Warning`.
    pub fn severity(&self) -> Severity {
        match self {
            Rejection::MaxTier(_)
            | Rejection::NothingToUnassign(_)
            | Rejection::AlreadyResearched(_) => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// Validates and applies one command to `world`, recording success notifications.
///
/// `world` is only written once validation has passed. `AdvanceTurn` is resolved by the
/// engine's systems and is a no-op here.
pub(crate) fn execute(rules: &Rules, world: &mut WorldState, command: &Command) -> Result<(), Rejection> {
    match command {
        Command::BuildStructure { structure } => build(rules, world, structure),
        Command::UpgradeStructure { structure } => upgrade(rules, world, structure),
        Command::UpgradeHousing => upgrade_housing(rules, world),
        Command::AssignSpecialist { structure } => assign(rules, world, structure),
        Command::UnassignSpecialist { structure } => unassign(rules, world, structure),
        Command::ResearchTopic { research } => research_topic(rules, world, research),
        Command::DeclareWar { rival } => set_diplomacy(world, rival, DiplomaticStatus::War),
        Command::MakePeace { rival } => set_diplomacy(world, rival, DiplomaticStatus::Peace),
        Command::DismissNotification { id } => {
            world.notifications.dismiss(*id);
            Ok(())
        }
        Command::PostNotification { message, severity } => {
            world.notify(message.clone(), *severity);
            Ok(())
        }
        Command::AdvanceTurn => Ok(()),
    }
}

fn build(rules: &Rules, world: &mut WorldState, id: &StructureId) -> Result<(), Rejection> {
    let def = rules
        .catalog
        .structure(id)
        .ok_or_else(|| Rejection::UnknownStructure(id.clone()))?;
    if world.player.has_structure(id) {
        return Err(Rejection::AlreadyBuilt(def.name.clone()));
    }
    if let Some(gate) = &def.unlocked_by {
        if !world.is_researched(gate) {
            let research = rules
                .catalog
                .research(gate)
                .map_or_else(|| gate.to_string(), |topic| topic.name.clone());
            return Err(Rejection::Locked {
                name: def.name.clone(),
                research,
            });
        }
    }
    if !world.stockpile.covers(&def.cost) {
        return Err(Rejection::CannotAffordBuild(def.name.clone()));
    }

    world.stockpile.deduct(&def.cost);
    world.player.structures.push(BuiltStructure::new(id.clone()));
    world.notify(format!("{} constructed (Tier 1).", def.name), Severity::Success);
    Ok(())
}

fn upgrade(rules: &Rules, world: &mut WorldState, id: &StructureId) -> Result<(), Rejection> {
    let def = rules
        .catalog
        .structure(id)
        .ok_or_else(|| Rejection::UnknownStructure(id.clone()))?;
    let built = world
        .player
        .structure(id)
        .ok_or_else(|| Rejection::NotBuilt(def.name.clone()))?;
    if built.tier >= def.max_tier {
        return Err(Rejection::MaxTier(def.name.clone()));
    }
    let next_tier = built.tier + 1;
    let cost = rules.structure_upgrade_cost(built);
    if !world.stockpile.covers(&cost) {
        return Err(Rejection::CannotAffordUpgrade {
            name: def.name.clone(),
            tier: next_tier,
        });
    }

    world.stockpile.deduct(&cost);
    if let Some(built) = world.player.structure_mut(id) {
        built.tier = next_tier;
        built.assigned_specialists = built.assigned_specialists.min(def.capacity_at(next_tier));
    }
    world.notify(
        format!("{} upgraded to Tier {next_tier}!", def.name),
        Severity::Success,
    );
    Ok(())
}

fn upgrade_housing(rules: &Rules, world: &mut WorldState) -> Result<(), Rejection> {
    let cost = rules.housing_upgrade_cost(world.player.housing_level);
    if !world.stockpile.covers(&cost) {
        return Err(Rejection::CannotAffordHousing);
    }

    world.stockpile.deduct(&cost);
    let level = world.player.housing_level + 1;
    world.player.set_housing_level(level, &rules.tuning);
    let message = format!(
        "Housing expanded to Level {level}. Max disciples now {}.",
        world.player.max_population
    );
    world.notify(message, Severity::Success);
    Ok(())
}

fn assign(rules: &Rules, world: &mut WorldState, id: &StructureId) -> Result<(), Rejection> {
    let def = rules
        .catalog
        .structure(id)
        .ok_or_else(|| Rejection::UnknownStructure(id.clone()))?;
    let free = world.player.unassigned_population();
    let built = world
        .player
        .structure_mut(id)
        .ok_or_else(|| Rejection::NotBuilt(def.name.clone()))?;
    if free <= 0 {
        return Err(Rejection::NoFreePopulation);
    }
    if built.assigned_specialists >= def.capacity_at(built.tier) {
        return Err(Rejection::SlotsFull(def.name.clone()));
    }

    built.assigned_specialists += 1;
    world.notify(
        format!("A disciple has been assigned as a specialist in {}.", def.name),
        Severity::Success,
    );
    Ok(())
}

fn unassign(rules: &Rules, world: &mut WorldState, id: &StructureId) -> Result<(), Rejection> {
    let name = rules.structure_name(id).to_string();
    let Some(built) = world
        .player
        .structure_mut(id)
        .filter(|built| built.assigned_specialists > 0)
    else {
        return Err(Rejection::NothingToUnassign(name));
    };

    built.assigned_specialists -= 1;
    world.notify(
        format!("A specialist has been unassigned from {name}."),
        Severity::Success,
    );
    Ok(())
}

fn research_topic(rules: &Rules, world: &mut WorldState, id: &ResearchId) -> Result<(), Rejection> {
    let def = rules
        .catalog
        .research(id)
        .ok_or_else(|| Rejection::UnknownResearch(id.clone()))?;
    if world.is_researched(id) {
        return Err(Rejection::AlreadyResearched(def.name.clone()));
    }
    if let Some(missing) = def
        .prerequisites
        .iter()
        .find(|prerequisite| !world.is_researched(prerequisite))
    {
        let missing = rules
            .catalog
            .research(missing)
            .map_or_else(|| missing.to_string(), |topic| topic.name.clone());
        return Err(Rejection::MissingPrerequisite {
            name: def.name.clone(),
            missing,
        });
    }
    if world.stockpile.get(Resource::Research) < def.cost {
        return Err(Rejection::CannotAffordResearch(def.name.clone()));
    }

    world.stockpile.add(Resource::Research, -def.cost);
    world.researched.insert(id.clone());
    world.notify(format!("{} researched.", def.name), Severity::Success);
    Ok(())
}

fn set_diplomacy(
    world: &mut WorldState,
    id: &SettlementId,
    status: DiplomaticStatus,
) -> Result<(), Rejection> {
    let rival = world
        .rival_mut(id)
        .ok_or_else(|| Rejection::UnknownRival(id.clone()))?;
    rival.diplomacy = status;
    let name = rival.settlement.name.clone();
    match status {
        DiplomaticStatus::War => world.notify(
            format!("You have declared war on {name}!"),
            Severity::Warning,
        ),
        DiplomaticStatus::Peace => world.notify(
            format!("Peace has been established with {name}."),
            Severity::Success,
        ),
    }
    Ok(())
}
