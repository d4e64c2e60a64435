//! Invariants that must hold after any sequence of commands.

use proptest::prelude::*;

use sectsim::{
    catalog::Catalog,
    command::{Command, Rejection},
    engine::Engine,
    notifications::Severity,
    scenario::Scenario,
    world::{BuiltStructure, Settlement, WorldState},
    yields::Resource,
    Rules,
};

const STRUCTURES: [&str; 6] = [
    "scripture_pavilion",
    "ancestral_shrine",
    "treasure_pavilion",
    "proving_grounds",
    "martial_bastion",
    "not_a_structure",
];

const TOPICS: [&str; 5] = [
    "basic_qi_circulation",
    "spirit_herb_recognition",
    "foundation_establishment",
    "sect_doctrine_basics",
    "basic_martial_conditioning",
];

const RIVALS: [&str; 3] = ["rival_sect_shadow_talon", "rival_sect_jade_serpent", "nobody"];

fn structure() -> impl Strategy<Value = String> {
    prop::sample::select(STRUCTURES.to_vec()).prop_map(String::from)
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => Just(Command::AdvanceTurn),
        2 => structure().prop_map(|s| Command::BuildStructure { structure: s.as_str().into() }),
        2 => structure().prop_map(|s| Command::UpgradeStructure { structure: s.as_str().into() }),
        1 => Just(Command::UpgradeHousing),
        2 => structure().prop_map(|s| Command::AssignSpecialist { structure: s.as_str().into() }),
        1 => structure().prop_map(|s| Command::UnassignSpecialist { structure: s.as_str().into() }),
        1 => prop::sample::select(TOPICS.to_vec())
            .prop_map(|t| Command::ResearchTopic { research: t.into() }),
        1 => prop::sample::select(RIVALS.to_vec())
            .prop_map(|r| Command::DeclareWar { rival: r.into() }),
        1 => prop::sample::select(RIVALS.to_vec())
            .prop_map(|r| Command::MakePeace { rival: r.into() }),
        1 => Just(Command::PostNotification {
            message: "Incense is lit.".into(),
            severity: Severity::Info,
        }),
    ]
}

/// A crowded, well-stocked start so growth, upgrades and specialist moves all get exercised.
fn busy_start(population: u32, surplus: f64) -> WorldState {
    let scenario = Scenario::standard();
    let mut world = scenario.build_world().expect("standard world");
    let tuning = scenario.rules().tuning;
    world.player = Settlement::new("main_peak", "Celestial Summit Sect", population, 14, &tuning);
    world.stockpile.set(Resource::Currency, 2000.0);
    world.stockpile.set(Resource::Production, 2000.0);
    world.stockpile.set(Resource::Research, 200.0);
    world.food_surplus = surplus;
    world
}

fn check_invariants(world: &WorldState, catalog: &Catalog) -> Result<(), TestCaseError> {
    let settlements = std::iter::once((&world.player, &world.stockpile, world.food_surplus)).chain(
        world
            .rivals
            .iter()
            .map(|r| (&r.settlement, &r.resources, r.food_surplus)),
    );
    for (settlement, stockpile, surplus) in settlements {
        prop_assert!(settlement.population <= settlement.max_population);
        prop_assert!(settlement.total_specialists() <= settlement.population);
        prop_assert!((0..=100).contains(&settlement.morale));
        prop_assert!(surplus >= 0.0);
        for built in &settlement.structures {
            let capacity = catalog
                .structure(&built.id)
                .map_or(0, |def| def.capacity_at(built.tier));
            prop_assert!(built.assigned_specialists <= capacity);
        }
        for (resource, amount) in stockpile.iter() {
            prop_assert!(amount >= -1e-9, "{resource} went negative: {amount}");
        }
    }
    for note in world.notifications.entries() {
        prop_assert!(world.turn - note.turn < 5, "stale notification {note:?}");
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn invariants_hold_across_command_streams(
        seed in any::<u64>(),
        population in 1u32..70,
        surplus in 0.0f64..200.0,
        commands in prop::collection::vec(command(), 1..60),
    ) {
        let engine = Engine::new(Rules::default(), seed);
        let mut world = busy_start(population, surplus);
        check_invariants(&world, &engine.rules().catalog)?;

        for command in commands {
            let turn = world.turn;
            let transition = engine.apply(&world, command.clone());
            if let Some(rejection) = transition.rejection() {
                let mut unchanged = transition.world.clone();
                unchanged.notifications = world.notifications.clone();
                prop_assert_eq!(&unchanged, &world, "rejected {:?} changed state", command);
                prop_assert_eq!(transition.notifications.len(), 1);
                prop_assert_eq!(transition.world.notifications.len(), world.notifications.len() + 1);
                prop_assert_eq!(transition.notifications[0].severity, rejection.severity());
                if matches!(
                    rejection,
                    Rejection::CannotAffordBuild(_)
                        | Rejection::CannotAffordUpgrade { .. }
                        | Rejection::CannotAffordHousing
                        | Rejection::CannotAffordResearch(_)
                ) {
                    prop_assert_eq!(rejection.severity(), Severity::Warning);
                }
            }
            if command != Command::AdvanceTurn {
                prop_assert_eq!(transition.world.turn, turn);
            } else {
                prop_assert_eq!(transition.world.turn, turn + 1);
            }
            world = transition.world;
            check_invariants(&world, &engine.rules().catalog)?;
        }
    }

    #[test]
    fn unaffordable_spending_is_a_single_warning(
        currency in 0.0f64..40.0,
        production in 0.0f64..15.0,
        built_tier in 1u32..3,
    ) {
        let engine = Engine::new(Rules::default(), 9);
        let mut world = busy_start(10, 0.0);
        world.player.structures.push(BuiltStructure {
            id: "scripture_pavilion".into(),
            tier: built_tier,
            assigned_specialists: 0,
        });
        world.researched.insert("sect_doctrine_basics".into());
        world.stockpile.set(Resource::Currency, currency);
        world.stockpile.set(Resource::Production, production);

        let attempts = [
            Command::BuildStructure { structure: "proving_grounds".into() },
            Command::UpgradeStructure { structure: "scripture_pavilion".into() },
            Command::UpgradeHousing,
        ];
        for command in attempts {
            let transition = engine.apply(&world, command.clone());
            prop_assert!(
                matches!(
                    transition.rejection(),
                    Some(
                        Rejection::CannotAffordBuild(_)
                            | Rejection::CannotAffordUpgrade { .. }
                            | Rejection::CannotAffordHousing
                    )
                ),
                "{:?} was not refused as unaffordable",
                command
            );
            prop_assert_eq!(transition.notifications.len(), 1);
            prop_assert_eq!(transition.notifications[0].severity, Severity::Warning);
            prop_assert_eq!(&transition.world.stockpile, &world.stockpile);
            prop_assert_eq!(&transition.world.player, &world.player);
        }
    }

    #[test]
    fn same_seed_same_history(
        seed in any::<u64>(),
        commands in prop::collection::vec(command(), 1..40),
    ) {
        let run = || {
            let engine = Engine::new(Rules::default(), seed);
            commands
                .iter()
                .fold(busy_start(40, 50.0), |world, command| {
                    engine.apply(&world, command.clone()).world
                })
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn starvation_never_leaves_negative_food(
        population in 1u32..70,
        food in 0.0f64..30.0,
        surplus in 0.0f64..30.0,
        turns in 1u32..10,
    ) {
        let engine = Engine::new(Rules::default(), 3);
        let mut start = busy_start(population, surplus);
        start.stockpile.set(Resource::Food, food);

        let end = engine.run_with_hook(&start, turns, |world| {
            assert!(world.stockpile.get(Resource::Food) >= 0.0);
            assert!(world.food_surplus >= 0.0);
        });
        prop_assert_eq!(end.turn, 1 + turns);
    }
}
