pub mod catalog;
pub mod command;
pub mod config;
pub mod economy;
pub mod engine;
pub mod notifications;
pub mod rng;
pub mod scenario;
pub mod systems;
pub mod world;
pub mod yields;

pub use command::{Command, Rejection};
pub use economy::Rules;
pub use engine::{Engine, EngineBuilder, Outcome, Transition};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::WorldState;
