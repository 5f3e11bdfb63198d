use std::{collections::BTreeMap, sync::mpsc, time::Duration};

use gridfall_core::{
    Archetype, ArchetypeId, CellCoord, Clock, ConfigError, Direction, FrameEntityKind, Intent,
    ManualClock, MapDefinition, MonsterId, MonsterRecord, Notification, PlayerRecord,
    RewardEvent, SessionConfig, SessionData, SessionState, StatCatalog, StrategyKind,
};
use gridfall_session::GameLoop;
use gridfall_world::query;

const SLIME: i32 = -1;
const KNIGHT: i32 = -3;
const TICK: Duration = Duration::from_millis(16);

fn session_data(tiles: Vec<Vec<i32>>, player_health: u32) -> SessionData {
    let mut catalog = StatCatalog {
        player: PlayerRecord {
            max_health: player_health,
            ..PlayerRecord::default()
        },
        ..StatCatalog::default()
    };
    let _ = catalog.monsters.insert(
        ArchetypeId::new(1),
        MonsterRecord {
            archetype: Archetype::Slime,
            max_health: 2,
            power: 5,
            cost: 3,
            move_cooldown: Duration::from_millis(400),
            attack_cooldown: Duration::from_millis(400),
            strategy: Some(StrategyKind::Pursuit),
        },
    );
    SessionData {
        map: MapDefinition {
            tiles,
            placements: BTreeMap::new(),
            chest_reward: 2,
        },
        catalog,
        config: SessionConfig::default(),
    }
}

fn session(tiles: Vec<Vec<i32>>, player_health: u32) -> GameLoop<ManualClock> {
    GameLoop::new(session_data(tiles, player_health), ManualClock::new()).expect("valid session")
}

#[test]
fn pausing_twice_stays_paused_and_resuming_while_running_is_a_no_op() {
    let mut game = session(vec![vec![3, 0, 0]], 10);

    game.resume();
    assert_eq!(game.state(), SessionState::Running);

    game.submit(Intent::Pause);
    game.submit(Intent::Pause);
    let frame = game.step(TICK);
    assert_eq!(frame.state, SessionState::Paused);

    game.pause();
    assert_eq!(game.state(), SessionState::Paused);

    game.resume();
    game.resume();
    assert_eq!(game.state(), SessionState::Running);
}

#[test]
fn paused_sessions_still_emit_frames_but_ignore_player_intents() {
    let mut game = session(vec![vec![3, 0, 0]], 10);
    game.pause();
    game.submit(Intent::Move(Direction::East));

    let frame = game.step(TICK);
    assert_eq!(frame.state, SessionState::Paused);
    assert_eq!(frame.player.cell, CellCoord::new(0, 0));
    assert_eq!(query::now(game.world()), Duration::ZERO);
}

#[test]
fn defeat_ends_the_session_and_freezes_updates() {
    let mut game = session(vec![vec![3, SLIME, 0]], 1);

    let frame = game.step(TICK);
    assert_eq!(frame.state, SessionState::GameOver);
    assert!(frame.is_terminal());
    assert!(!frame.player.is_alive());

    let now = query::now(game.world());
    game.submit(Intent::Move(Direction::East));
    let frame = game.step(TICK);
    assert_eq!(frame.state, SessionState::GameOver);
    assert_eq!(query::now(game.world()), now);
}

#[test]
fn restart_rebuilds_the_initial_world() {
    let mut game = session(vec![vec![3, SLIME, 0]], 1);
    let _ = game.step(TICK);
    assert_eq!(game.state(), SessionState::GameOver);

    // The slime is still adjacent after the rebuild and wins again.
    game.submit(Intent::Restart);
    let frame = game.step(TICK);
    assert_eq!(game.state(), SessionState::GameOver);
    assert_eq!(frame.tick, 1);

    game.restart().expect("restart");
    assert_eq!(game.state(), SessionState::Running);
    assert_eq!(game.tick_count(), 0);
    let player = query::player_snapshot(game.world());
    assert_eq!(player.health, player.max_health);
    assert_eq!(player.cell, CellCoord::new(0, 0));
    assert_eq!(query::monster_view(game.world()).len(), 1);
}

#[test]
fn buffered_attack_eliminates_and_reports_the_reward() {
    let mut game = session(vec![vec![3, 1, SLIME]], 10);
    game.submit(Intent::Attack);

    let frame = game.step(TICK);
    assert_eq!(frame.state, SessionState::Running);
    assert_eq!(
        frame.rewards,
        vec![RewardEvent::MonsterEliminated {
            monster: MonsterId::new(0),
            cell: CellCoord::new(2, 0),
            value: 3,
        }]
    );
    assert_eq!(frame.pickups.len(), 1);
    assert_eq!((frame.player.kills, frame.player.score), (1, 3));
}

#[test]
fn reaching_the_finish_completes_the_session() {
    let mut game = session(vec![vec![3, 4]], 10);
    game.submit(Intent::Move(Direction::East));
    let frame = game.step(TICK);
    assert_eq!(frame.state, SessionState::Completed);
    assert!(frame.is_terminal());
}

#[test]
fn configuration_errors_surface_from_new() {
    let data = session_data(vec![vec![3, -7]], 10);
    let result = GameLoop::new(data, ManualClock::new());
    assert!(matches!(
        result,
        Err(ConfigError::UnknownArchetype {
            archetype,
            ..
        }) if archetype == ArchetypeId::new(7)
    ));
}

#[test]
fn zero_health_player_is_rejected_before_the_first_tick() {
    let result = GameLoop::new(session_data(vec![vec![3, 0, 0]], 0), ManualClock::new());
    assert!(matches!(result, Err(ConfigError::ZeroHealthPlayer)));
}

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

#[test]
fn pursuer_closes_in_on_the_player_through_the_loop() {
    let mut data = session_data(bordered_arena(), 20);
    let _ = data.catalog.monsters.insert(
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
    let mut game = GameLoop::new(data, ManualClock::new()).expect("valid arena");
    let player = CellCoord::new(5, 5);
    let knight = |frame: &gridfall_core::RenderFrame| {
        frame
            .entities
            .iter()
            .find(|entity| matches!(entity.kind, FrameEntityKind::Monster { .. }))
            .map(|entity| entity.cell)
            .expect("knight inside the window")
    };

    let start = query::monster_view(game.world())
        .iter()
        .next()
        .map(|monster| monster.cell)
        .expect("knight placed");
    let mut distance = start.manhattan_distance(player);
    assert_eq!(distance, 8);

    for _ in 0..32 {
        if distance == 1 {
            break;
        }
        let frame = game.step(Duration::from_millis(100));
        assert_eq!(frame.state, SessionState::Running);
        assert_eq!(frame.player.cell, player);
        assert_eq!(frame.origin, game.camera().origin());
        assert!(game.camera().is_in_view(player.column(), player.row()));

        let next = knight(&frame).manhattan_distance(player);
        assert!(next <= distance, "distance grew from {distance} to {next}");
        distance = next;
    }
    assert_eq!(distance, 1);

    // Once adjacent the pursuer holds its cell instead of stepping onto the player.
    let frame = game.step(Duration::from_millis(100));
    assert_eq!(knight(&frame).manhattan_distance(player), 1);
}

#[test]
fn frames_cover_the_camera_window_only() {
    let mut tiles = vec![vec![0; 12]; 12];
    tiles[6][6] = 3;
    tiles[0][0] = SLIME;
    let mut data = session_data(tiles, 10);
    data.config.window_size = 5;
    let mut game = GameLoop::new(data, ManualClock::new()).expect("valid session");

    let frame = game.step(TICK);
    assert_eq!(frame.origin, CellCoord::new(4, 4));
    assert_eq!(frame.tiles.len(), 25);
    assert!(frame.tiles.iter().all(Option::is_some));
    assert_eq!(frame.entities.len(), 1);
    assert_eq!(frame.entities[0].kind, FrameEntityKind::Player);
    assert!((frame.entities[0].health_fraction - 1.0).abs() < f32::EPSILON);
}

#[test]
fn run_paces_ticks_with_the_injected_clock() {
    let clock = ManualClock::new();
    let data = session_data(vec![vec![3, 0, 0]], 10);
    let interval = data.config.tick_interval();
    let mut game = GameLoop::new(data, clock.clone()).expect("valid session");
    let (intents, inputs) = mpsc::channel();
    let (notifications, frames) = mpsc::channel();

    intents.send(Intent::Move(Direction::East)).expect("loop alive");
    let state = game.run(&inputs, &notifications, Some(5));
    drop(intents);

    let received: Vec<Notification> = frames.try_iter().collect();
    assert_eq!(state, SessionState::Running);
    assert_eq!(received.len(), 6);
    assert_eq!(
        received.last(),
        Some(&Notification::Closed {
            state: SessionState::Running
        })
    );
    let Some(Notification::Frame(first)) = received.first() else {
        panic!("expected a frame first");
    };
    assert_eq!(first.player.cell, CellCoord::new(1, 0));
    assert_eq!(clock.now(), interval * 4);
}

#[test]
fn exit_intent_stops_the_loop_before_the_next_tick() {
    let mut game = session(vec![vec![3, 0]], 10);
    let (intents, inputs) = mpsc::channel();
    let (notifications, frames) = mpsc::channel();

    intents.send(Intent::Exit).expect("loop alive");
    let _ = game.run(&inputs, &notifications, None);

    let received: Vec<Notification> = frames.try_iter().collect();
    assert_eq!(
        received,
        vec![Notification::Closed {
            state: SessionState::Running
        }]
    );
}
