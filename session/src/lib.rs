#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-tick session loop tying the world, systems and camera together.
//!
//! A [`GameLoop`] owns everything a play session needs. Each tick drains the
//! queued intents, routes them through the world as commands, runs the pure
//! systems in a fixed order and finishes with an owned [`RenderFrame`].

mod loader;

use std::{
    collections::VecDeque,
    sync::mpsc::{Receiver, Sender, TryRecvError},
    time::Duration,
};

use gridfall_core::{
    CellCoord, Clock, Command, ConfigError, Event, FrameEntity, FrameEntityKind, FrameProjectile,
    Intent, Notification, RenderFrame, RewardEvent, SessionData, SessionState, WorldPoint,
};
use gridfall_system_camera::Camera;
use gridfall_system_combat::{Combat, CombatConfig};
use gridfall_system_movement::Movement;
use gridfall_world::{self as world, query, World};

pub use loader::{LoadError, MapLoader, MapSupplier};

/// Owns one play session and advances it tick by tick.
#[derive(Debug)]
pub struct GameLoop<C: Clock> {
    data: SessionData,
    world: World,
    movement: Movement,
    combat: Combat,
    camera: Camera,
    clock: C,
    state: SessionState,
    tick: u64,
    pending: VecDeque<Intent>,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl<C: Clock> GameLoop<C> {
    /// Builds a running session from its inputs.
    pub fn new(data: SessionData, clock: C) -> Result<Self, ConfigError> {
        let world = World::from_definition(&data.map, &data.catalog, &data.config)?;
        let (movement, combat, camera) = systems_for(&data, &world);
        let mut session = Self {
            data,
            world,
            movement,
            combat,
            camera,
            clock,
            state: SessionState::Running,
            tick: 0,
            pending: VecDeque::new(),
            events: Vec::new(),
            commands: Vec::new(),
        };
        session.recenter();
        tracing::info!(
            columns = query::grid(&session.world).columns(),
            rows = query::grid(&session.world).rows(),
            "session started"
        );
        Ok(session)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of ticks executed since the session was (re)built.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Camera following the player.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Suspends updates. Pausing twice keeps the session paused.
    pub fn pause(&mut self) {
        if self.state == SessionState::Running {
            self.transition(SessionState::Paused);
        }
    }

    /// Resumes updates. Has no effect unless the session is paused.
    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.transition(SessionState::Running);
        }
    }

    /// Rebuilds the world, systems and camera from the original inputs.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        let data = &self.data;
        let world = World::from_definition(&data.map, &data.catalog, &data.config)?;
        let (movement, combat, camera) = systems_for(&self.data, &world);
        self.world = world;
        self.movement = movement;
        self.combat = combat;
        self.camera = camera;
        self.tick = 0;
        self.recenter();
        self.transition(SessionState::Running);
        tracing::debug!("session restarted");
        Ok(())
    }

    /// Queues an intent for the next tick.
    pub fn submit(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Executes one tick of `dt` simulated time and returns the resulting frame.
    pub fn step(&mut self, dt: Duration) -> RenderFrame {
        self.events.clear();

        let mut player_intents = Vec::new();
        while let Some(intent) = self.pending.pop_front() {
            match intent {
                Intent::Pause => self.pause(),
                Intent::Resume => self.resume(),
                Intent::Restart => {
                    if let Err(error) = self.restart() {
                        tracing::error!(%error, "restart failed");
                    }
                }
                Intent::Exit => {}
                other => player_intents.push(other),
            }
        }
        self.tick = self.tick.saturating_add(1);

        if self.state == SessionState::Running {
            self.update(dt, player_intents);
        } else if !player_intents.is_empty() {
            tracing::trace!(
                state = ?self.state,
                dropped = player_intents.len(),
                "intents dropped"
            );
        }

        self.recenter();
        self.frame()
    }

    /// Runs ticks at the configured cadence until an `Exit` intent arrives,
    /// the input channel disconnects, the presenter hangs up or `max_ticks`
    /// ticks have run. Sends `Notification::Closed` last and returns the final
    /// state.
    pub fn run(
        &mut self,
        inputs: &Receiver<Intent>,
        notifications: &Sender<Notification>,
        max_ticks: Option<u64>,
    ) -> SessionState {
        let interval = self.data.config.tick_interval();
        let mut last = self.clock.now();
        let mut executed = 0u64;

        'ticks: loop {
            let mut disconnected = false;
            loop {
                match inputs.try_recv() {
                    Ok(Intent::Exit) => break 'ticks,
                    Ok(intent) => self.submit(intent),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }

            let now = self.clock.now();
            let dt = if executed == 0 {
                interval
            } else {
                now.saturating_sub(last)
            };
            last = now;

            let frame = self.step(dt);
            executed += 1;
            if notifications.send(Notification::Frame(frame)).is_err() {
                tracing::debug!("presenter hung up");
                break;
            }
            if disconnected || max_ticks.is_some_and(|limit| executed >= limit) {
                break;
            }

            let spent = self.clock.now().saturating_sub(now);
            self.clock.wait(interval.saturating_sub(spent));
        }

        let _ = notifications.send(Notification::Closed { state: self.state });
        tracing::info!(state = ?self.state, ticks = executed, "session loop stopped");
        self.state
    }

    fn update(&mut self, dt: Duration, player_intents: Vec<Intent>) {
        self.execute(Command::Tick { dt });

        let mut attack_requested = false;
        for intent in player_intents {
            match intent {
                Intent::Move(direction) => self.execute(Command::StepPlayer { direction }),
                Intent::Interact => self.execute(Command::Interact),
                Intent::UseItem => self.execute(Command::UseItem),
                Intent::Attack => attack_requested = true,
                Intent::Pause | Intent::Resume | Intent::Restart | Intent::Exit => {}
            }
        }

        let grid = query::grid(&self.world);
        let (columns, rows) = (grid.columns(), grid.rows());
        let player = query::player_snapshot(&self.world);
        let monsters = query::monster_view(&self.world);
        self.movement.handle(
            &self.events,
            &monsters,
            player.cell,
            columns,
            rows,
            |cell| query::is_obstacle(&self.world, cell),
            &mut self.commands,
        );
        self.flush_commands();

        let player = query::player_snapshot(&self.world);
        let monsters = query::monster_view(&self.world);
        let world = &self.world;
        let sight = |from, to| query::is_line_of_sight_clear(world, from, to);
        self.combat
            .resolve_monster_attacks(&player, &monsters, sight, &mut self.commands);
        if attack_requested {
            self.combat
                .resolve_player_attack(&player, &monsters, sight, &mut self.commands);
        }
        self.flush_commands();

        self.execute(Command::AdvanceProjectiles { dt });

        let defeated = !query::player_snapshot(&self.world).is_alive()
            || self
                .events
                .iter()
                .any(|event| matches!(event, Event::PlayerDefeated));
        if defeated {
            self.transition(SessionState::GameOver);
        } else if self
            .events
            .iter()
            .any(|event| matches!(event, Event::FinishReached { .. }))
        {
            self.transition(SessionState::Completed);
        }
    }

    fn execute(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn flush_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "session state changed");
            self.state = next;
        }
    }

    fn recenter(&mut self) {
        self.camera
            .center_on(query::player_snapshot(&self.world).cell);
    }

    fn frame(&self) -> RenderFrame {
        let grid = query::grid(&self.world);
        let tile_size = query::tile_size(&self.world);
        let camera = &self.camera;
        let in_view = |cell: CellCoord| camera.is_in_view(cell.column(), cell.row());

        let tiles = camera
            .window_cells()
            .map(|cell| cell.and_then(|cell| grid.tile(cell)))
            .collect();

        let player = query::player_snapshot(&self.world);
        let mut entities = vec![FrameEntity {
            kind: FrameEntityKind::Player,
            cell: player.cell,
            position: WorldPoint::cell_center(player.cell, tile_size),
            health_fraction: player.health.fraction_of(player.max_health),
        }];
        entities.extend(
            query::monster_view(&self.world)
                .iter()
                .filter(|monster| in_view(monster.cell))
                .map(|monster| FrameEntity {
                    kind: FrameEntityKind::Monster {
                        id: monster.id,
                        archetype: monster.archetype,
                    },
                    cell: monster.cell,
                    position: WorldPoint::cell_center(monster.cell, tile_size),
                    health_fraction: monster.health.fraction_of(monster.max_health),
                }),
        );

        let projectiles = query::projectiles(&self.world)
            .into_iter()
            .filter(|projectile| {
                projectile
                    .position
                    .containing_cell(tile_size)
                    .is_some_and(in_view)
            })
            .map(|projectile| FrameProjectile {
                id: projectile.id,
                position: projectile.position,
            })
            .collect();

        let pickups = query::pickups(&self.world)
            .into_iter()
            .filter(|pickup| in_view(pickup.cell))
            .collect();

        RenderFrame {
            tick: self.tick,
            state: self.state,
            origin: camera.origin(),
            window_size: camera.window_size(),
            tile_size,
            tiles,
            entities,
            projectiles,
            pickups,
            player,
            rewards: self.events.iter().filter_map(RewardEvent::from_event).collect(),
        }
    }
}

fn systems_for(data: &SessionData, world: &World) -> (Movement, Combat, Camera) {
    let grid = query::grid(world);
    (
        Movement::new(data.config.rng_seed),
        Combat::new(CombatConfig::from(&data.config)),
        Camera::new(data.config.window_size, grid.columns(), grid.rows()),
    )
}
