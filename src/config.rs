//! Tuning constants for the turn rules and logging settings for the host.

use serde::{Deserialize, Serialize};

use crate::yields::{Resource, YieldBundle};

fn default_player_base_yields() -> YieldBundle {
    YieldBundle::from([
        (Resource::Food, 5.0),
        (Resource::Production, 3.0),
        (Resource::Currency, 2.0),
        (Resource::Research, 0.0),
        (Resource::Prestige, 0.5),
        (Resource::Faith, 0.0),
    ])
}

fn default_rival_base_yields() -> YieldBundle {
    YieldBundle::from([
        (Resource::Food, 3.0),
        (Resource::Production, 2.0),
        (Resource::Currency, 3.0),
        (Resource::Research, 1.0),
        (Resource::Prestige, 0.2),
        (Resource::Faith, 0.1),
    ])
}

fn default_housing_per_level() -> u32 {
    5
}

fn default_housing_base_cost() -> YieldBundle {
    YieldBundle::from([(Resource::Production, 20.0), (Resource::Currency, 30.0)])
}

fn default_food_per_new_pop() -> f64 {
    20.0
}

fn default_base_morale() -> i32 {
    75
}

fn default_morale_penalty_per_pop() -> i32 {
    1
}

fn default_low_morale_threshold() -> i32 {
    30
}

fn default_critical_morale_threshold() -> i32 {
    15
}

fn default_population_loss_chance() -> f64 {
    0.2
}

fn default_rival_housing_chance() -> f64 {
    0.25
}

fn default_notification_window() -> u32 {
    5
}

/// Numbers the turn rules read. Every field has a default, so a scenario only lists what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    #[serde(default = "default_player_base_yields")]
    pub player_base_yields: YieldBundle,
    #[serde(default = "default_rival_base_yields")]
    pub rival_base_yields: YieldBundle,
    #[serde(default = "default_housing_per_level")]
    pub housing_per_level: u32,
    #[serde(default = "default_housing_base_cost")]
    pub housing_base_cost: YieldBundle,
    #[serde(default = "default_food_per_new_pop")]
    pub food_per_new_pop: f64,
    #[serde(default = "default_base_morale")]
    pub base_morale: i32,
    #[serde(default = "default_morale_penalty_per_pop")]
    pub morale_penalty_per_pop: i32,
    #[serde(default = "default_low_morale_threshold")]
    pub low_morale_threshold: i32,
    #[serde(default = "default_critical_morale_threshold")]
    pub critical_morale_threshold: i32,
    #[serde(default = "default_population_loss_chance")]
    pub population_loss_chance: f64,
    #[serde(default = "default_rival_housing_chance")]
    pub rival_housing_chance: f64,
    /// Notifications are dropped once they are this many turns old.
    #[serde(default = "default_notification_window")]
    pub notification_window: u32,
}

impl Tuning {
    pub fn max_population(&self, housing_level: u32) -> u32 {
        housing_level.saturating_mul(self.housing_per_level)
    }

    /// Morale for a given population, clamped to `0..=100`.
    pub fn morale_for(&self, population: u32) -> i32 {
        let penalty = i64::from(population) * i64::from(self.morale_penalty_per_pop);
        (i64::from(self.base_morale) - penalty).clamp(0, 100) as i32
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_base_yields: default_player_base_yields(),
            rival_base_yields: default_rival_base_yields(),
            housing_per_level: default_housing_per_level(),
            housing_base_cost: default_housing_base_cost(),
            food_per_new_pop: default_food_per_new_pop(),
            base_morale: default_base_morale(),
            morale_penalty_per_pop: default_morale_penalty_per_pop(),
            low_morale_threshold: default_low_morale_threshold(),
            critical_morale_threshold: default_critical_morale_threshold(),
            population_loss_chance: default_population_loss_chance(),
            rival_housing_chance: default_rival_housing_chance(),
            notification_window: default_notification_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
