use std::fs;

use sectsim::{
    command::Command,
    engine::{Engine, EngineBuilder},
    scenario::{Scenario, ScenarioLoader},
    world::{BuiltStructure, DiplomaticStatus, WorldState},
    yields::Resource,
};
use tempfile::tempdir;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

/// Applies each turn's scripted orders, then advances, the way the binary does.
fn play(engine: &Engine, scenario: &Scenario, start: &WorldState, turns: u32) -> WorldState {
    let mut world = start.clone();
    for _ in 0..turns {
        for command in scenario.orders_for(world.turn) {
            world = engine.apply(&world, command.clone()).world;
        }
        world = engine.advance_turn(&world);
    }
    world
}

#[test]
fn shipped_scenario_matches_the_built_in_opening() {
    let scenario = scenario_loader()
        .load("scenarios/standard.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.name, "standard");
    assert_eq!(scenario.seed, 42);
    assert_eq!(scenario.turns(None), 20);
    assert_eq!(scenario.orders.len(), 3);
    assert_eq!(scenario.logging.level, "info");

    let from_file = scenario.build_world().expect("world builds");
    let built_in = Scenario::standard().build_world().expect("world builds");
    assert_eq!(from_file, built_in);
}

#[test]
fn scripted_orders_play_out() {
    let scenario = scenario_loader()
        .load("scenarios/standard.yaml")
        .expect("scenario parses");
    let engine = EngineBuilder::new(scenario.rules())
        .with_seed(scenario.seed)
        .with_standard_systems()
        .build();
    let start = scenario.build_world().unwrap();

    let world = play(&engine, &scenario, &start, 8);
    assert_eq!(world.turn, 9);
    assert_eq!(world.player.structures.len(), 1);
    assert_eq!(world.player.structures[0].assigned_specialists, 1);
    assert!(world.is_researched(&"basic_qi_circulation".into()));
    // 2 from turn 1, 3 per turn after the specialist arrives, minus the topic's 15
    assert_eq!(world.stockpile.get(Resource::Research), 5.0 + 2.0 + 3.0 * 7.0 - 15.0);
}

#[test]
fn loader_reads_a_minimal_file_with_defaults() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("valley.yaml"),
        r#"
name: valley
player:
  settlement:
    id: valley
    name: Quiet Valley Sect
    population: 3
    housing_level: 1
  stockpile:
    Food: 8
    Currency: 10
rivals:
  - settlement:
      id: raiders
      name: Mountain Raiders
      population: 2
      housing_level: 1
    resources:
      Food: 4
    diplomacy: War
tuning:
  food_per_new_pop: 10
"#,
    )
    .expect("write scenario");

    let scenario = ScenarioLoader::new(dir.path())
        .load("valley.yaml")
        .expect("scenario parses");
    assert_eq!(scenario.seed, 42);
    assert!(scenario.orders.is_empty());
    assert_eq!(scenario.tuning.food_per_new_pop, 10.0);
    assert_eq!(scenario.tuning.housing_per_level, 5);

    let rules = scenario.rules();
    assert_eq!(rules.catalog.structures().len(), 5);

    let world = scenario.build_world().expect("world builds");
    assert_eq!(world.player.max_population, 5);
    assert_eq!(world.rivals[0].diplomacy, DiplomaticStatus::War);
    assert_eq!(world.stockpile.get(Resource::Production), 0.0);
}

#[test]
fn custom_catalog_replaces_the_standard_one() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("hermit.yaml"),
        r#"
name: hermit
player:
  settlement: { id: hut, name: Hermit Hut, population: 1, housing_level: 1 }
  stockpile: { Currency: 5 }
catalog:
  structures:
    - id: herb_garden
      name: Herb Garden
      description: Grows food.
      cost: { Currency: 5 }
      base_yield: { Food: 2 }
      max_tier: 1
      specialist_capacity: [1]
      specialist_bonus: { Food: 1 }
  research: []
"#,
    )
    .expect("write scenario");

    let scenario = ScenarioLoader::new(dir.path())
        .load("hermit.yaml")
        .expect("scenario parses");
    let rules = scenario.rules();
    assert_eq!(rules.catalog.structures().len(), 1);
    assert!(rules.catalog.research_topics().is_empty());

    let world = scenario.build_world().unwrap();
    let engine = Engine::new(rules, scenario.seed);
    let built = engine.apply(
        &world,
        Command::BuildStructure {
            structure: "herb_garden".into(),
        },
    );
    assert!(built.is_applied());
    assert_eq!(built.world.stockpile.get(Resource::Currency), 0.0);
}

#[test]
fn broken_files_report_their_path() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.yaml"), "name: [unclosed").expect("write scenario");
    let loader = ScenarioLoader::new(dir.path());

    let err = loader.load("broken.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("broken.yaml"));

    let err = loader.load("missing.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read scenario file"));
}

#[test]
fn invalid_catalog_is_refused_at_load() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("bad_catalog.yaml"),
        r#"
name: bad
player:
  settlement: { id: hut, name: Hut, population: 1, housing_level: 1 }
  stockpile: {}
catalog:
  structures:
    - id: tower
      name: Tower
      description: Too few capacities.
      cost: {}
      base_yield: {}
      max_tier: 2
      specialist_capacity: [1]
      specialist_bonus: {}
  research: []
"#,
    )
    .expect("write scenario");

    let err = ScenarioLoader::new(dir.path())
        .load("bad_catalog.yaml")
        .unwrap_err();
    assert!(format!("{err:#}").contains("specialist capacities"));
}

fn staffed(id: &str, tier: u32, assigned: u32) -> BuiltStructure {
    BuiltStructure {
        id: id.into(),
        tier,
        assigned_specialists: assigned,
    }
}

fn start_error(structures: Vec<BuiltStructure>) -> String {
    let mut scenario = Scenario::standard();
    scenario.player.settlement.structures = structures;
    let err = scenario
        .build_world()
        .expect_err("starting structures should be refused");
    format!("{err:#}")
}

#[test]
fn starting_structures_must_be_in_the_catalog() {
    let err = start_error(vec![staffed("no_such_thing", 1, 0)]);
    assert!(err.contains("unknown structure `no_such_thing`"), "{err}");
}

#[test]
fn starting_structures_must_be_unique() {
    let err = start_error(vec![
        staffed("scripture_pavilion", 1, 0),
        staffed("scripture_pavilion", 2, 0),
    ]);
    assert!(err.contains("more than once"), "{err}");
}

#[test]
fn starting_tiers_must_be_within_range() {
    let err = start_error(vec![staffed("scripture_pavilion", 0, 0)]);
    assert!(err.contains("tier 0, outside 1..=3"), "{err}");

    let err = start_error(vec![staffed("scripture_pavilion", 9, 0)]);
    assert!(err.contains("tier 9, outside 1..=3"), "{err}");
}

#[test]
fn starting_specialists_must_fit_their_slots() {
    let err = start_error(vec![staffed("scripture_pavilion", 1, 2)]);
    assert!(err.contains("only 1 slots at tier 1"), "{err}");
}

#[test]
fn starting_research_must_be_in_the_catalog() {
    let mut scenario = Scenario::standard();
    scenario.player.researched = vec!["lost_scroll".into()];
    let err = scenario.build_world().unwrap_err();
    assert!(err.to_string().contains("unknown research `lost_scroll`"));
}

#[test]
fn malformed_structures_in_yaml_never_reach_the_world() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("cheat.yaml"),
        r#"
name: cheat
player:
  settlement:
    id: hut
    name: Hut
    population: 2
    housing_level: 1
    structures:
      - { id: scripture_pavilion, tier: 0 }
      - { id: scripture_pavilion, tier: 9 }
      - { id: no_such_thing, tier: 1 }
  stockpile: { Currency: 100, Production: 100 }
"#,
    )
    .expect("write scenario");

    let scenario = ScenarioLoader::new(dir.path())
        .load("cheat.yaml")
        .expect("scenario parses");
    assert!(scenario.build_world().is_err());
}

#[test]
fn valid_starting_structures_are_kept() {
    let mut scenario = Scenario::standard();
    scenario.player.researched = vec!["basic_qi_circulation".into()];
    scenario.player.settlement.structures = vec![
        staffed("scripture_pavilion", 2, 2),
        staffed("treasure_pavilion", 1, 1),
    ];
    let world = scenario.build_world().expect("world builds");
    assert_eq!(world.player.structures.len(), 2);
    assert_eq!(world.player.total_specialists(), 3);
    assert!(world.is_researched(&"basic_qi_circulation".into()));
}
