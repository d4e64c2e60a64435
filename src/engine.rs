use rand::RngCore;
use tracing::{debug, info};

use crate::command::{self, Command, Rejection};
use crate::economy::Rules;
use crate::notifications::{Notification, NotificationId};
use crate::rng::{RngSource, SeededRng, SystemId};
use crate::systems::{GrowthSystem, HarvestSystem, HousingSystem, MoraleSystem, SpecialistSystem};
use crate::world::WorldState;
use crate::yields::Resource;

pub struct SystemContext<'a> {
    /// Turn being resolved, before the counter advances.
    pub turn: u32,
    pub rules: &'a Rules,
    rng: &'a dyn RngSource,
}

impl<'a> SystemContext<'a> {
    pub fn new(turn: u32, rules: &'a Rules, rng: &'a dyn RngSource) -> Self {
        Self { turn, rules, rng }
    }

    pub fn rng(&self, system: SystemId, entity: u64) -> Box<dyn RngCore> {
        self.rng.stream(system, self.turn, entity)
    }
}

/// One step of turn resolution. Systems run in registration order against the same working
/// copy of the world, each covering the player and every rival before the next one starts.
pub trait System {
    fn name(&self) -> &str;
    fn system_id(&self) -> SystemId;
    fn run(&self, ctx: &SystemContext<'_>, world: &mut WorldState);
}

pub struct EngineBuilder {
    rules: Rules,
    rng: Box<dyn RngSource>,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            rng: Box::new(SeededRng::default()),
            systems: Vec::new(),
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(SeededRng::new(seed))
    }

    pub fn with_rng(mut self, rng: impl RngSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Registers the full turn pipeline in resolution order.
    pub fn with_standard_systems(self) -> Self {
        self.with_system(HarvestSystem::new())
            .with_system(MoraleSystem::new())
            .with_system(SpecialistSystem::new())
            .with_system(GrowthSystem::new())
            .with_system(HousingSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rules: self.rules,
            rng: self.rng,
            systems: self.systems,
        }
    }
}

/// Applies commands to world snapshots. Holds rules and randomness but never a world: every
/// call reads one snapshot and returns a new one.
pub struct Engine {
    rules: Rules,
    rng: Box<dyn RngSource>,
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    /// Standard pipeline with a seeded random source.
    pub fn new(rules: Rules, seed: u64) -> Self {
        EngineBuilder::new(rules)
            .with_seed(seed)
            .with_standard_systems()
            .build()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn apply(&self, world: &WorldState, command: Command) -> Transition {
        let mark = world.notifications.next_id();
        match command {
            Command::AdvanceTurn => {
                let next = self.advance_turn(world);
                Transition::new(next, Outcome::Applied, mark)
            }
            command => {
                let mut next = world.clone();
                match command::execute(&self.rules, &mut next, &command) {
                    Ok(()) => Transition::new(next, Outcome::Applied, mark),
                    Err(rejection) => {
                        debug!(?command, %rejection, "command rejected");
                        let mut unchanged = world.clone();
                        unchanged.notify(rejection.to_string(), rejection.severity());
                        Transition::new(unchanged, Outcome::Rejected(rejection), mark)
                    }
                }
            }
        }
    }

    pub fn advance_turn(&self, world: &WorldState) -> WorldState {
        let mut next = world.clone();
        let ctx = SystemContext::new(world.turn, &self.rules, self.rng.as_ref());
        for system in &self.systems {
            debug!(system = system.name(), turn = ctx.turn, "running system");
            system.run(&ctx, &mut next);
        }
        next.turn += 1;
        next.notifications
            .prune(next.turn, self.rules.tuning.notification_window);
        info!(
            turn = next.turn,
            population = next.player.population,
            food = next.stockpile.get(Resource::Food),
            "turn resolved"
        );
        next
    }

    pub fn run(&self, world: &WorldState, turns: u32) -> WorldState {
        self.run_with_hook(world, turns, |_| {})
    }

    /// Advances `turns` times, handing every intermediate world to `hook`.
    pub fn run_with_hook<F>(&self, world: &WorldState, turns: u32, mut hook: F) -> WorldState
    where
        F: FnMut(&WorldState),
    {
        let mut current = world.clone();
        for _ in 0..turns {
            current = self.advance_turn(&current);
            hook(&current);
        }
        current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub world: WorldState,
    pub outcome: Outcome,
    /// Notifications this transition appended, still present after pruning.
    pub notifications: Vec<Notification>,
}

impl Transition {
    fn new(world: WorldState, outcome: Outcome, mark: NotificationId) -> Self {
        let notifications = world.notifications.issued_since(mark).cloned().collect();
        Self {
            world,
            outcome,
            notifications,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, Outcome::Applied)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.outcome {
            Outcome::Rejected(rejection) => Some(rejection),
            Outcome::Applied => None,
        }
    }
}
