use std::{collections::BTreeMap, time::Duration};

use gridfall_core::{
    Archetype, ArchetypeId, CellCoord, Command, Event, MapDefinition, MonsterRecord,
    SessionConfig, StatCatalog, StrategyKind,
};
use gridfall_system_movement::Movement;
use gridfall_world::{self as world, query, World};

const KNIGHT: i32 = -3;

fn bordered_arena() -> Vec<Vec<i32>> {
    let mut rows = vec![vec![0; 10]; 10];
    for (row_index, row) in rows.iter_mut().enumerate() {
        for (column_index, code) in row.iter_mut().enumerate() {
            if row_index == 0 || row_index == 9 || column_index == 0 || column_index == 9 {
                *code = 1;
            }
        }
    }
    rows[5][5] = 3;
    rows[1][1] = KNIGHT;
    rows
}

fn catalog() -> StatCatalog {
    let mut catalog = StatCatalog::default();
    let _ = catalog.monsters.insert(
        ArchetypeId::new(3),
        MonsterRecord {
            archetype: Archetype::Knight,
            max_health: 6,
            power: 1,
            cost: 4,
            move_cooldown: Duration::from_millis(100),
            attack_cooldown: Duration::from_secs(1),
            strategy: Some(StrategyKind::Pursuit),
        },
    );
    catalog
}

fn tick(world: &mut World, movement: &mut Movement) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );

    let grid = query::grid(world);
    let (columns, rows) = (grid.columns(), grid.rows());
    let player = query::player_snapshot(world).cell;
    let monsters = query::monster_view(world);
    let mut commands = Vec::new();
    movement.handle(
        &events,
        &monsters,
        player,
        columns,
        rows,
        |cell| query::is_obstacle(world, cell),
        &mut commands,
    );

    let mut step_events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut step_events);
    }
    step_events
}

fn knight_cell(world: &World) -> CellCoord {
    query::monster_view(world)
        .iter()
        .next()
        .map(|monster| monster.cell)
        .expect("knight present")
}

#[test]
fn pursuing_monster_closes_distance_every_tick() {
    let map = MapDefinition {
        tiles: bordered_arena(),
        placements: BTreeMap::new(),
        chest_reward: 0,
    };
    let mut world =
        World::from_definition(&map, &catalog(), &SessionConfig::default()).expect("valid arena");
    let mut movement = Movement::new(1);
    let player = query::player_snapshot(&world).cell;
    assert_eq!(player, CellCoord::new(5, 5));

    let mut distance = knight_cell(&world).manhattan_distance(player);
    assert_eq!(distance, 8);

    while distance > 1 {
        let events = tick(&mut world, &mut movement);
        assert!(
            events
                .iter()
                .any(|event| matches!(event, Event::MonsterMoved { .. })),
            "pursuer stalled at distance {distance}"
        );
        let next = knight_cell(&world).manhattan_distance(player);
        assert!(next < distance, "distance grew from {distance} to {next}");
        distance = next;
    }

    // Adjacent pursuers propose the player's cell, which the world refuses.
    let events = tick(&mut world, &mut movement);
    assert!(events.is_empty());
    assert_eq!(knight_cell(&world).manhattan_distance(player), 1);
}

#[test]
fn no_commands_without_time_advancing() {
    let map = MapDefinition {
        tiles: bordered_arena(),
        placements: BTreeMap::new(),
        chest_reward: 0,
    };
    let world =
        World::from_definition(&map, &catalog(), &SessionConfig::default()).expect("valid arena");
    let mut movement = Movement::new(1);
    let mut commands = Vec::new();
    movement.handle(
        &[],
        &query::monster_view(&world),
        query::player_snapshot(&world).cell,
        10,
        10,
        |cell| query::is_obstacle(&world, cell),
        &mut commands,
    );
    assert!(commands.is_empty());
}
