use std::{collections::BTreeMap, time::Duration};

use gridfall_core::{
    Archetype, ArchetypeId, CellCoord, Command, Event, MapDefinition, MonsterRecord,
    SessionConfig, StatCatalog,
};
use gridfall_system_movement::Movement;
use gridfall_world::{self as world, query, World};

#[test]
fn same_seed_replays_identical_movement() {
    let first = replay(42, 120);
    let second = replay(42, 120);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first
            .iter()
            .any(|event| matches!(event, Event::MonsterMoved { .. })),
        "wanderers never moved"
    );
}

#[test]
fn monsters_stay_on_walkable_cells() {
    let mut world = arena();
    let mut movement = Movement::new(9);
    for _ in 0..200 {
        let _ = step(&mut world, &mut movement);
        for monster in query::monster_view(&world).iter() {
            assert!(query::grid(&world).is_walkable(monster.cell));
            assert_ne!(monster.cell, query::player_snapshot(&world).cell);
        }
    }
}

fn arena() -> World {
    let mut tiles = vec![vec![0; 8]; 6];
    tiles[0][0] = 3;
    tiles[2][2] = -1;
    tiles[3][5] = -2;
    tiles[4][1] = -4;
    tiles[2][4] = 1;
    tiles[3][3] = 5;

    let mut catalog = StatCatalog::default();
    for (id, archetype) in [
        (1, Archetype::Slime),
        (2, Archetype::Bat),
        (4, Archetype::Archer),
    ] {
        let _ = catalog.monsters.insert(
            ArchetypeId::new(id),
            MonsterRecord {
                archetype,
                max_health: 3,
                power: 1,
                cost: 1,
                move_cooldown: Duration::from_millis(50),
                attack_cooldown: Duration::from_secs(1),
                strategy: None,
            },
        );
    }

    let map = MapDefinition {
        tiles,
        placements: BTreeMap::new(),
        chest_reward: 0,
    };
    World::from_definition(&map, &catalog, &SessionConfig::default()).expect("valid arena")
}

fn step(world: &mut World, movement: &mut Movement) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(50),
        },
        &mut events,
    );

    let grid = query::grid(world);
    let (columns, rows) = (grid.columns(), grid.rows());
    let player: CellCoord = query::player_snapshot(world).cell;
    let mut commands = Vec::new();
    movement.handle(
        &events,
        &query::monster_view(world),
        player,
        columns,
        rows,
        |cell| query::is_obstacle(world, cell),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn replay(seed: u64, ticks: usize) -> Vec<Event> {
    let mut world = arena();
    let mut movement = Movement::new(seed);
    let mut log = Vec::new();
    for _ in 0..ticks {
        log.extend(step(&mut world, &mut movement));
    }
    log
}
