use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{ResearchId, StructureId};
use crate::config::Tuning;
use crate::notifications::NotificationLog;
use crate::yields::{Resource, YieldBundle};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(String);

impl SettlementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SettlementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for SettlementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltStructure {
    pub id: StructureId,
    pub tier: u32,
    #[serde(default)]
    pub assigned_specialists: u32,
}

impl BuiltStructure {
    pub fn new(id: StructureId) -> Self {
        Self {
            id,
            tier: 1,
            assigned_specialists: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub population: u32,
    pub max_population: u32,
    pub housing_level: u32,
    pub morale: i32,
    /// Build order.
    #[serde(default)]
    pub structures: Vec<BuiltStructure>,
}

impl Settlement {
    /// A structureless settlement with housing-derived capacity and morale for its population.
    pub fn new(
        id: impl Into<SettlementId>,
        name: impl Into<String>,
        population: u32,
        housing_level: u32,
        tuning: &Tuning,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            population,
            max_population: tuning.max_population(housing_level),
            housing_level,
            morale: tuning.morale_for(population),
            structures: Vec::new(),
        }
    }

    pub fn total_specialists(&self) -> u32 {
        self.structures.iter().map(|s| s.assigned_specialists).sum()
    }

    /// Population not currently working as a specialist. Negative only if the specialist
    /// bound has been broken by hand.
    pub fn unassigned_population(&self) -> i64 {
        i64::from(self.population) - i64::from(self.total_specialists())
    }

    pub fn structure(&self, id: &StructureId) -> Option<&BuiltStructure> {
        self.structures.iter().find(|s| &s.id == id)
    }

    pub fn structure_mut(&mut self, id: &StructureId) -> Option<&mut BuiltStructure> {
        self.structures.iter_mut().find(|s| &s.id == id)
    }

    pub fn has_structure(&self, id: &StructureId) -> bool {
        self.structure(id).is_some()
    }

    pub fn set_housing_level(&mut self, level: u32, tuning: &Tuning) {
        self.housing_level = level;
        self.max_population = tuning.max_population(level);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiplomaticStatus {
    Peace,
    War,
}

impl std::fmt::Display for DiplomaticStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiplomaticStatus::Peace => f.write_str("Peace"),
            DiplomaticStatus::War => f.write_str("War"),
        }
    }
}

/// A rival keeps its own stockpile and food surplus; the player's live on [`WorldState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rival {
    pub settlement: Settlement,
    pub resources: YieldBundle,
    #[serde(default)]
    pub food_surplus: f64,
    #[serde(default = "default_diplomacy")]
    pub diplomacy: DiplomaticStatus,
}

fn default_diplomacy() -> DiplomaticStatus {
    DiplomaticStatus::Peace
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Player,
    Rival,
}

impl Role {
    pub fn is_player(self) -> bool {
        matches!(self, Role::Player)
    }
}

/// Mutable handle on one settlement together with the stockpile and surplus pool it draws on.
#[derive(Debug)]
pub struct Ledger<'a> {
    /// 0 for the player, `1 + n` for the n-th rival.
    pub index: u64,
    pub role: Role,
    pub settlement: &'a mut Settlement,
    pub stockpile: &'a mut YieldBundle,
    pub food_surplus: &'a mut f64,
}

/// Disjoint mutable borrows over a [`WorldState`] for the turn systems.
#[derive(Debug)]
pub struct TurnView<'a> {
    pub turn: u32,
    pub researched: &'a BTreeSet<ResearchId>,
    pub ledgers: Vec<Ledger<'a>>,
    pub notifications: &'a mut NotificationLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub player: Settlement,
    pub stockpile: YieldBundle,
    #[serde(default)]
    pub researched: BTreeSet<ResearchId>,
    pub turn: u32,
    #[serde(default)]
    pub food_surplus: f64,
    #[serde(default)]
    pub rivals: Vec<Rival>,
    #[serde(default)]
    pub notifications: NotificationLog,
}

impl WorldState {
    pub fn new(player: Settlement, stockpile: YieldBundle) -> Self {
        Self {
            player,
            stockpile,
            researched: BTreeSet::new(),
            turn: 1,
            food_surplus: 0.0,
            rivals: Vec::new(),
            notifications: NotificationLog::new(),
        }
    }

    pub fn with_rival(mut self, rival: Rival) -> Self {
        self.rivals.push(rival);
        self
    }

    pub fn rival(&self, id: &SettlementId) -> Option<&Rival> {
        self.rivals.iter().find(|rival| &rival.settlement.id == id)
    }

    pub fn rival_mut(&mut self, id: &SettlementId) -> Option<&mut Rival> {
        self.rivals.iter_mut().find(|rival| &rival.settlement.id == id)
    }

    pub fn is_researched(&self, id: &ResearchId) -> bool {
        self.researched.contains(id)
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: crate::notifications::Severity) {
        let turn = self.turn;
        self.notifications.push(message, severity, turn);
    }

    pub fn turn_view(&mut self) -> TurnView<'_> {
        let mut ledgers = Vec::with_capacity(self.rivals.len() + 1);
        ledgers.push(Ledger {
            index: 0,
            role: Role::Player,
            settlement: &mut self.player,
            stockpile: &mut self.stockpile,
            food_surplus: &mut self.food_surplus,
        });
        for (offset, rival) in self.rivals.iter_mut().enumerate() {
            ledgers.push(Ledger {
                index: offset as u64 + 1,
                role: Role::Rival,
                settlement: &mut rival.settlement,
                stockpile: &mut rival.resources,
                food_surplus: &mut rival.food_surplus,
            });
        }
        TurnView {
            turn: self.turn,
            researched: &self.researched,
            ledgers,
            notifications: &mut self.notifications,
        }
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            turn: self.turn,
            player: SettlementSummary::from_parts(&self.player, &self.stockpile, self.food_surplus),
            researched: self.researched.iter().map(|id| id.to_string()).collect(),
            rivals: self
                .rivals
                .iter()
                .map(|rival| RivalSummary {
                    settlement: SettlementSummary::from_parts(
                        &rival.settlement,
                        &rival.resources,
                        rival.food_surplus,
                    ),
                    diplomacy: rival.diplomacy,
                })
                .collect(),
            notifications: self.notifications.len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub id: String,
    pub name: String,
    pub population: u32,
    pub max_population: u32,
    pub housing_level: u32,
    pub morale: i32,
    pub specialists: u32,
    pub structures: usize,
    pub food: f64,
    pub food_surplus: f64,
    pub stockpile: YieldBundle,
}

impl SettlementSummary {
    fn from_parts(settlement: &Settlement, stockpile: &YieldBundle, food_surplus: f64) -> Self {
        Self {
            id: settlement.id.to_string(),
            name: settlement.name.clone(),
            population: settlement.population,
            max_population: settlement.max_population,
            housing_level: settlement.housing_level,
            morale: settlement.morale,
            specialists: settlement.total_specialists(),
            structures: settlement.structures.len(),
            food: stockpile.get(Resource::Food),
            food_surplus,
            stockpile: stockpile.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RivalSummary {
    pub settlement: SettlementSummary,
    pub diplomacy: DiplomaticStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorldSummary {
    pub turn: u32,
    pub player: SettlementSummary,
    pub researched: Vec<String>,
    pub rivals: Vec<RivalSummary>,
    pub notifications: usize,
}
