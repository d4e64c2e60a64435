use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sectsim::{
    engine::EngineBuilder,
    notifications::{Notification, Severity},
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Sect settlement turn runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/standard.yaml")]
    scenario: PathBuf,

    /// Override turn count (uses scenario default when omitted)
    #[arg(long)]
    turns: Option<u32>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print a JSON summary after every turn
    #[arg(long)]
    json: bool,
}

fn log_notification(notification: &Notification) {
    match notification.severity {
        Severity::Warning | Severity::Error => {
            warn!(turn = notification.turn, severity = %notification.severity, "{}", notification.message)
        }
        Severity::Info | Severity::Success => {
            info!(turn = notification.turn, severity = %notification.severity, "{}", notification.message)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut world = scenario.build_world()?;
    let turns = scenario.turns(cli.turns);
    let engine = EngineBuilder::new(scenario.rules())
        .with_seed(cli.seed.unwrap_or(scenario.seed))
        .with_standard_systems()
        .build();

    for _ in 0..turns {
        for command in scenario.orders_for(world.turn) {
            let transition = engine.apply(&world, command.clone());
            transition.notifications.iter().for_each(log_notification);
            world = transition.world;
        }

        let mark = world.notifications.next_id();
        world = engine.advance_turn(&world);
        world
            .notifications
            .issued_since(mark)
            .for_each(log_notification);

        if cli.json {
            println!("{}", serde_json::to_string(&world.summary())?);
        }
    }

    println!(
        "Scenario '{}' completed after {} turns. Disciples: {}/{}, morale {}%, rivals tracked: {}",
        scenario.name,
        turns,
        world.player.population,
        world.player.max_population,
        world.player.morale,
        world.rivals.len()
    );
    Ok(())
}
