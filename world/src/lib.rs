#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gridfall.
//!
//! The world owns the grid, the player, the monster roster, pickups, chests
//! and projectiles. It only changes through [`apply`], which validates every
//! command and reports the outcome as [`Event`] values. Rejected commands
//! leave the world untouched and emit nothing.

mod grid;
mod projectiles;
mod setup;
mod sight;

use std::{collections::BTreeMap, time::Duration};

use gridfall_core::{
    Archetype, AttackStyle, CellCoord, Command, DamageSource, Direction, Event, Health,
    MonsterId, Offset, PickupId, ProjectileId, StrategyKind, TileKind, WorldPoint,
};

pub use grid::Grid;

use projectiles::Projectile;

/// Represents the authoritative Gridfall world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    rules: Rules,
    now: Duration,
    player: Player,
    monsters: Vec<Monster>,
    pickups: Vec<Pickup>,
    chests: BTreeMap<CellCoord, u32>,
    projectiles: Vec<Projectile>,
    next_pickup: u32,
    next_projectile: u32,
}

#[derive(Debug)]
struct Rules {
    tile_size: f32,
    hazard_damage: u32,
}

/// Minimum interval between two uses of an action, measured in simulated time.
#[derive(Clone, Copy, Debug)]
struct Cooldown {
    interval: Duration,
    last: Option<Duration>,
}

impl Cooldown {
    const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    fn ready_in(&self, now: Duration) -> Duration {
        match self.last {
            Some(last) => last.saturating_add(self.interval).saturating_sub(now),
            None => Duration::ZERO,
        }
    }

    fn is_ready(&self, now: Duration) -> bool {
        self.ready_in(now).is_zero()
    }

    fn trigger(&mut self, now: Duration) {
        self.last = Some(now);
    }
}

#[derive(Debug)]
struct Player {
    cell: CellCoord,
    health: Health,
    max_health: Health,
    power: u32,
    defense: u32,
    currency: u32,
    kills: u32,
    score: u32,
    potions: u32,
    potion_heal: u32,
    move_cooldown: Cooldown,
    attack_cooldown: Cooldown,
}

impl Player {
    fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }
}

#[derive(Debug)]
struct Monster {
    id: MonsterId,
    archetype: Archetype,
    cell: CellCoord,
    health: Health,
    max_health: Health,
    power: u32,
    cost: u32,
    strategy: StrategyKind,
    move_cooldown: Cooldown,
    attack_cooldown: Cooldown,
    projectile: Option<ProjectileId>,
}

#[derive(Clone, Copy, Debug)]
struct Pickup {
    id: PickupId,
    cell: CellCoord,
    value: u32,
}

impl World {
    fn monster_index(&self, id: MonsterId) -> Option<usize> {
        self.monsters
            .binary_search_by_key(&id, |monster| monster.id)
            .ok()
    }

    fn monster_at(&self, cell: CellCoord) -> Option<MonsterId> {
        self.monsters
            .iter()
            .find(|monster| monster.cell == cell)
            .map(|monster| monster.id)
    }

    fn step_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }
        if !self.player.move_cooldown.is_ready(self.now) {
            tracing::trace!(?direction, "player step dropped: cooldown");
            return;
        }

        let from = self.player.cell;
        let (columns, rows) = (self.grid.columns(), self.grid.rows());
        let Some(to) = from.offset_within(direction.offset(), columns, rows) else {
            tracing::trace!(?direction, "player step dropped: outside grid");
            return;
        };
        if !self.grid.is_walkable(to) || self.monster_at(to).is_some() {
            tracing::trace!(cell = %to, "player step dropped: blocked");
            return;
        }

        self.player.move_cooldown.trigger(self.now);
        self.player.cell = to;
        out_events.push(Event::PlayerMoved { from, to });

        let mut collected = Vec::new();
        self.pickups.retain(|pickup| {
            if pickup.cell == to {
                collected.push(*pickup);
                false
            } else {
                true
            }
        });
        for pickup in collected {
            self.player.currency = self.player.currency.saturating_add(pickup.value);
            out_events.push(Event::PickupCollected {
                pickup: pickup.id,
                cell: pickup.cell,
                value: pickup.value,
            });
        }

        match self.grid.tile(to) {
            Some(TileKind::Hazard) => {
                let damage = self.rules.hazard_damage;
                out_events.push(Event::HazardStepped { cell: to, damage });
                self.hurt_player(DamageSource::Hazard, damage, out_events);
            }
            Some(TileKind::Finish) => out_events.push(Event::FinishReached { cell: to }),
            _ => {}
        }
    }

    fn interact(&mut self, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }
        let origin = self.player.cell;
        let adjacent: Vec<(CellCoord, u32)> = self
            .chests
            .iter()
            .filter(|(cell, _)| cell.chebyshev_distance(origin) <= 1)
            .map(|(cell, value)| (*cell, *value))
            .collect();

        for (cell, value) in adjacent {
            let _ = self.chests.remove(&cell);
            self.grid.set(cell, TileKind::Floor);
            self.player.currency = self.player.currency.saturating_add(value);
            out_events.push(Event::ChestOpened { cell, value });
        }
    }

    fn use_item(&mut self, out_events: &mut Vec<Event>) {
        let player = &mut self.player;
        if !player.is_alive() || player.potions == 0 || player.health >= player.max_health {
            tracing::trace!(potions = player.potions, "potion dropped");
            return;
        }

        player.potions -= 1;
        let before = player.health;
        player.health = before.restore(player.potion_heal, player.max_health);
        out_events.push(Event::PlayerHealed {
            amount: player.health.get() - before.get(),
            remaining: player.health,
        });
    }

    fn step_monster(&mut self, id: MonsterId, offset: Offset, out_events: &mut Vec<Event>) {
        let Some(index) = self.monster_index(id) else {
            return;
        };
        let now = self.now;
        let monster = &mut self.monsters[index];
        if !monster.move_cooldown.is_ready(now) {
            return;
        }
        monster.move_cooldown.trigger(now);

        if offset.is_zero() || !offset.is_single_step() {
            return;
        }
        let from = monster.cell;
        let Some(to) = from.offset_within(offset, self.grid.columns(), self.grid.rows()) else {
            return;
        };
        if !self.grid.is_walkable(to) || to == self.player.cell || self.monster_at(to).is_some() {
            tracing::trace!(monster = id.get(), cell = %to, "monster step rejected");
            return;
        }

        self.monsters[index].cell = to;
        out_events.push(Event::MonsterMoved {
            monster: id,
            from,
            to,
        });
    }

    fn player_strike(&mut self, mut targets: Vec<MonsterId>, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() || !self.player.attack_cooldown.is_ready(self.now) {
            tracing::trace!("player strike dropped");
            return;
        }
        self.player.attack_cooldown.trigger(self.now);

        targets.sort_unstable();
        targets.dedup();
        let damage = self.player.power;
        for id in targets {
            let Some(index) = self.monster_index(id) else {
                continue;
            };
            let monster = &mut self.monsters[index];
            monster.health = monster.health.saturating_sub(damage);
            out_events.push(Event::MonsterDamaged {
                monster: id,
                amount: damage,
                remaining: monster.health,
            });
            if monster.health.is_zero() {
                self.eliminate(index, out_events);
            }
        }
    }

    fn eliminate(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let monster = self.monsters.remove(index);
        self.player.kills = self.player.kills.saturating_add(1);
        self.player.score = self.player.score.saturating_add(monster.cost);
        out_events.push(Event::MonsterEliminated {
            monster: monster.id,
            cell: monster.cell,
            reward: monster.cost,
        });

        let pickup = Pickup {
            id: PickupId::new(self.next_pickup),
            cell: monster.cell,
            value: monster.cost,
        };
        self.next_pickup = self.next_pickup.wrapping_add(1);
        self.pickups.push(pickup);
        out_events.push(Event::PickupSpawned {
            pickup: pickup.id,
            cell: pickup.cell,
            value: pickup.value,
        });
        tracing::debug!(monster = monster.id.get(), cell = %monster.cell, "monster eliminated");
    }

    fn monster_strike(&mut self, id: MonsterId, out_events: &mut Vec<Event>) {
        let Some(index) = self.monster_index(id) else {
            return;
        };
        if !self.player.is_alive() {
            return;
        }
        let now = self.now;
        let player_cell = self.player.cell;
        let monster = &mut self.monsters[index];
        let AttackStyle::Melee { radius } = monster.archetype.attack_style() else {
            return;
        };
        if monster.cell.chebyshev_distance(player_cell) > radius
            || !monster.attack_cooldown.is_ready(now)
        {
            return;
        }

        monster.attack_cooldown.trigger(now);
        let damage = monster.power.saturating_sub(self.player.defense);
        self.hurt_player(DamageSource::Melee(id), damage, out_events);
    }

    fn fire_projectile(&mut self, id: MonsterId, target: CellCoord, out_events: &mut Vec<Event>) {
        let Some(index) = self.monster_index(id) else {
            return;
        };
        if !self.player.is_alive() {
            return;
        }
        let now = self.now;
        let tile_size = self.rules.tile_size;
        let monster = &mut self.monsters[index];
        let AttackStyle::Ranged { range, speed } = monster.archetype.attack_style() else {
            return;
        };
        if monster.projectile.is_some()
            || monster.cell.chebyshev_distance(target) > range
            || !monster.attack_cooldown.is_ready(now)
        {
            return;
        }

        let projectile_id = ProjectileId::new(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        monster.attack_cooldown.trigger(now);
        monster.projectile = Some(projectile_id);
        self.projectiles.push(Projectile::launch(
            projectile_id,
            id,
            WorldPoint::cell_center(monster.cell, tile_size),
            WorldPoint::cell_center(target, tile_size),
            speed as f32 * tile_size,
            range as f32 * tile_size,
        ));
        out_events.push(Event::ProjectileFired {
            projectile: projectile_id,
            monster: id,
            target,
        });

        if target == self.player.cell {
            let damage = monster.power.saturating_sub(self.player.defense);
            self.hurt_player(DamageSource::Ranged(id), damage, out_events);
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut expired = Vec::new();
        self.projectiles.retain_mut(|projectile| {
            if projectile.advance(dt) {
                expired.push((projectile.id, projectile.monster));
                false
            } else {
                true
            }
        });

        for (projectile, owner) in expired {
            if let Some(index) = self.monster_index(owner) {
                let monster = &mut self.monsters[index];
                if monster.projectile == Some(projectile) {
                    monster.projectile = None;
                }
            }
            out_events.push(Event::ProjectileExpired { projectile });
        }
    }

    fn hurt_player(&mut self, source: DamageSource, amount: u32, out_events: &mut Vec<Event>) {
        if !self.player.is_alive() {
            return;
        }
        self.player.health = self.player.health.saturating_sub(amount);
        out_events.push(Event::PlayerDamaged {
            source,
            amount,
            remaining: self.player.health,
        });
        if self.player.health.is_zero() {
            tracing::debug!(?source, "player defeated");
            out_events.push(Event::PlayerDefeated);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.now = world.now.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::StepPlayer { direction } => world.step_player(direction, out_events),
        Command::Interact => world.interact(out_events),
        Command::UseItem => world.use_item(out_events),
        Command::StepMonster { monster, offset } => {
            world.step_monster(monster, offset, out_events);
        }
        Command::PlayerStrike { targets } => world.player_strike(targets, out_events),
        Command::MonsterStrike { monster } => world.monster_strike(monster, out_events),
        Command::FireProjectile { monster, target } => {
            world.fire_projectile(monster, target, out_events);
        }
        Command::AdvanceProjectiles { dt } => world.advance_projectiles(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use gridfall_core::{
        CellCoord, MonsterSnapshot, MonsterView, PickupSnapshot, PlayerSnapshot,
        ProjectileSnapshot,
    };

    use super::{sight, Grid, World};

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Simulated time accumulated from ticks.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Edge length of a tile in world units.
    #[must_use]
    pub fn tile_size(world: &World) -> f32 {
        world.rules.tile_size
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player_snapshot(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            cell: player.cell,
            health: player.health,
            max_health: player.max_health,
            power: player.power,
            defense: player.defense,
            currency: player.currency,
            kills: player.kills,
            score: player.score,
            potions: player.potions,
            move_ready_in: player.move_cooldown.ready_in(world.now),
            attack_ready_in: player.attack_cooldown.ready_in(world.now),
        }
    }

    /// Captures a read-only view of the monster roster.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        let snapshots = world
            .monsters
            .iter()
            .map(|monster| MonsterSnapshot {
                id: monster.id,
                archetype: monster.archetype,
                cell: monster.cell,
                health: monster.health,
                max_health: monster.max_health,
                power: monster.power,
                cost: monster.cost,
                strategy: monster.strategy,
                move_ready_in: monster.move_cooldown.ready_in(world.now),
                attack_ready_in: monster.attack_cooldown.ready_in(world.now),
                projectile_in_flight: monster.projectile,
            })
            .collect();
        MonsterView::from_snapshots(snapshots)
    }

    /// Captures every projectile in flight, oldest first.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Captures every uncollected pickup.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<PickupSnapshot> {
        world
            .pickups
            .iter()
            .map(|pickup| PickupSnapshot {
                id: pickup.id,
                cell: pickup.cell,
                value: pickup.value,
            })
            .collect()
    }

    /// Number of chests that have not been opened yet.
    #[must_use]
    pub fn unopened_chests(world: &World) -> usize {
        world.chests.len()
    }

    /// Reports whether no intermediate cell between `from` and `to` blocks sight.
    #[must_use]
    pub fn is_line_of_sight_clear(world: &World, from: CellCoord, to: CellCoord) -> bool {
        sight::line_of_sight_clear(&world.grid, from, to)
    }

    /// Reports whether the cell stops movement. Cells outside the grid do.
    #[must_use]
    pub fn is_obstacle(world: &World, cell: CellCoord) -> bool {
        world.grid.is_obstacle(cell)
    }
}
