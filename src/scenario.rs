use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, ResearchId},
    command::Command,
    config::{LoggingConfig, Tuning},
    economy::Rules,
    world::{BuiltStructure, DiplomaticStatus, Rival, Settlement, WorldState},
    yields::{Resource, YieldBundle},
};

fn default_seed() -> u64 {
    42
}

fn default_turns() -> u32 {
    20
}

fn default_diplomacy() -> DiplomaticStatus {
    DiplomaticStatus::Peace
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub turns: Option<u32>,
    #[serde(default)]
    pub tuning: Tuning,
    /// Replaces the standard catalog when present.
    #[serde(default)]
    pub catalog: Option<Catalog>,
    pub player: PlayerStart,
    #[serde(default)]
    pub rivals: Vec<RivalStart>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementStart {
    pub id: String,
    pub name: String,
    pub population: u32,
    pub housing_level: u32,
    #[serde(default)]
    pub structures: Vec<BuiltStructure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStart {
    pub settlement: SettlementStart,
    pub stockpile: YieldBundle,
    #[serde(default)]
    pub researched: Vec<ResearchId>,
    #[serde(default)]
    pub food_surplus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RivalStart {
    pub settlement: SettlementStart,
    pub resources: YieldBundle,
    #[serde(default)]
    pub food_surplus: f64,
    #[serde(default = "default_diplomacy")]
    pub diplomacy: DiplomaticStatus,
}

/// A command the host submits at the start of `turn`, before that turn is advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub turn: u32,
    pub command: Command,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl SettlementStart {
    fn build(&self, rules: &Rules) -> Result<Settlement> {
        ensure!(
            self.housing_level >= 1,
            "settlement `{}` needs a housing level of at least 1",
            self.id
        );
        let mut settlement = Settlement::new(
            self.id.as_str(),
            self.name.clone(),
            self.population,
            self.housing_level,
            &rules.tuning,
        );
        ensure!(
            settlement.population <= settlement.max_population,
            "settlement `{}` starts with {} disciples but houses only {}",
            self.id,
            settlement.population,
            settlement.max_population
        );

        let mut seen = BTreeSet::new();
        for built in &self.structures {
            let def = rules.catalog.structure(&built.id).with_context(|| {
                format!("settlement `{}` starts with unknown structure `{}`", self.id, built.id)
            })?;
            ensure!(
                seen.insert(&built.id),
                "settlement `{}` lists structure `{}` more than once",
                self.id,
                built.id
            );
            ensure!(
                (1..=def.max_tier).contains(&built.tier),
                "structure `{}` in `{}` is at tier {}, outside 1..={}",
                built.id,
                self.id,
                built.tier,
                def.max_tier
            );
            ensure!(
                built.assigned_specialists <= def.capacity_at(built.tier),
                "structure `{}` in `{}` has {} specialists but only {} slots at tier {}",
                built.id,
                self.id,
                built.assigned_specialists,
                def.capacity_at(built.tier),
                built.tier
            );
        }
        settlement.structures = self.structures.clone();
        ensure!(
            settlement.total_specialists() <= settlement.population,
            "settlement `{}` assigns more specialists than it has disciples",
            self.id
        );
        Ok(settlement)
    }
}

impl Scenario {
    pub fn rules(&self) -> Rules {
        Rules::new(self.catalog.clone().unwrap_or_default(), self.tuning.clone())
    }

    /// Initial world for this scenario, at turn 1 with an empty notification log.
    pub fn build_world(&self) -> Result<WorldState> {
        let rules = self.rules();
        let player = self.player.settlement.build(&rules)?;
        let mut world = WorldState::new(player, self.player.stockpile.clone());
        for id in &self.player.researched {
            ensure!(
                rules.catalog.research(id).is_some(),
                "player starts with unknown research `{id}`"
            );
        }
        world.researched = self.player.researched.iter().cloned().collect();
        world.food_surplus = self.player.food_surplus;

        for rival in &self.rivals {
            let settlement = rival.settlement.build(&rules)?;
            ensure!(
                world.rival(&settlement.id).is_none(),
                "duplicate rival id `{}`",
                settlement.id
            );
            world.rivals.push(Rival {
                settlement,
                resources: rival.resources.clone(),
                food_surplus: rival.food_surplus,
                diplomacy: rival.diplomacy,
            });
        }
        Ok(world)
    }

    pub fn turns(&self, override_turns: Option<u32>) -> u32 {
        override_turns.or(self.turns).unwrap_or_else(default_turns)
    }

    /// Scripted commands for `turn`, in file order.
    pub fn orders_for(&self, turn: u32) -> impl Iterator<Item = &Command> + '_ {
        self.orders
            .iter()
            .filter(move |order| order.turn == turn)
            .map(|order| &order.command)
    }

    /// The sect and its two neighbours as a new game starts them.
    pub fn standard() -> Self {
        use Resource::*;

        Self {
            name: "standard".into(),
            description: Some("Celestial Summit Sect and two neighbouring sects".into()),
            seed: default_seed(),
            turns: Some(default_turns()),
            tuning: Tuning::default(),
            catalog: None,
            player: PlayerStart {
                settlement: SettlementStart {
                    id: "main_peak".into(),
                    name: "Celestial Summit Sect".into(),
                    population: 5,
                    housing_level: 2,
                    structures: Vec::new(),
                },
                stockpile: YieldBundle::from([
                    (Currency, 100.0),
                    (Research, 5.0),
                    (Food, 20.0),
                    (Production, 25.0),
                    (Prestige, 0.0),
                    (Faith, 0.0),
                ]),
                researched: Vec::new(),
                food_surplus: 0.0,
            },
            rivals: vec![
                RivalStart {
                    settlement: SettlementStart {
                        id: "rival_sect_shadow_talon".into(),
                        name: "Shadow Talon Clan".into(),
                        population: 3,
                        housing_level: 1,
                        structures: Vec::new(),
                    },
                    resources: YieldBundle::from([
                        (Currency, 50.0),
                        (Research, 2.0),
                        (Food, 10.0),
                        (Production, 10.0),
                        (Prestige, 0.0),
                        (Faith, 0.0),
                    ]),
                    food_surplus: 0.0,
                    diplomacy: DiplomaticStatus::Peace,
                },
                RivalStart {
                    settlement: SettlementStart {
                        id: "rival_sect_jade_serpent".into(),
                        name: "Jade Serpent Sect".into(),
                        population: 4,
                        housing_level: 1,
                        structures: Vec::new(),
                    },
                    resources: YieldBundle::from([
                        (Currency, 60.0),
                        (Research, 1.0),
                        (Food, 15.0),
                        (Production, 5.0),
                        (Prestige, 1.0),
                        (Faith, 0.0),
                    ]),
                    food_surplus: 5.0,
                    diplomacy: DiplomaticStatus::Peace,
                },
            ],
            orders: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}
