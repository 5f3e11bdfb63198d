#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns range, sight and cooldown checks into strike commands.

use gridfall_core::{
    AttackStyle, CellCoord, Command, MonsterId, MonsterView, PlayerSnapshot, SessionConfig,
    SightGate,
};

/// Rules applied when selecting targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatConfig {
    /// Chebyshev reach of the player's strike, in cells.
    pub player_range: u32,
    /// Sight rule shared by player strikes and ranged monsters.
    pub sight_gate: SightGate,
}

impl From<&SessionConfig> for CombatConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            player_range: config.player_attack_range,
            sight_gate: config.sight_gate,
        }
    }
}

/// Combat resolver that queues strike and fire commands.
#[derive(Debug)]
pub struct Combat {
    config: CombatConfig,
    targets: Vec<MonsterId>,
}

impl Combat {
    /// Creates a resolver with empty scratch buffers.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            targets: Vec::new(),
        }
    }

    /// Rules the resolver applies.
    #[must_use]
    pub const fn config(&self) -> CombatConfig {
        self.config
    }

    /// Emits one `Command::PlayerStrike` naming every monster the player hits.
    ///
    /// Nothing is emitted while the attack cooldown runs or when no monster
    /// qualifies. `is_sight_clear` receives the player's cell first.
    pub fn resolve_player_attack<F>(
        &mut self,
        player: &PlayerSnapshot,
        monsters: &MonsterView,
        is_sight_clear: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord, CellCoord) -> bool,
    {
        if !player.is_alive() || !player.attack_ready() {
            return;
        }

        self.targets.clear();
        for monster in monsters.iter() {
            if monster.health.is_zero()
                || monster.cell.chebyshev_distance(player.cell) > self.config.player_range
            {
                continue;
            }
            if self
                .config
                .sight_gate
                .permits(is_sight_clear(player.cell, monster.cell))
            {
                self.targets.push(monster.id);
            }
        }

        if self.targets.is_empty() {
            return;
        }
        out.push(Command::PlayerStrike {
            targets: std::mem::take(&mut self.targets),
        });
    }

    /// Emits strike or fire commands for every monster able to attack.
    pub fn resolve_monster_attacks<F>(
        &mut self,
        player: &PlayerSnapshot,
        monsters: &MonsterView,
        is_sight_clear: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord, CellCoord) -> bool,
    {
        if !player.is_alive() {
            return;
        }

        for monster in monsters.iter() {
            if monster.health.is_zero() || !monster.attack_ready_in.is_zero() {
                continue;
            }
            let distance = monster.cell.chebyshev_distance(player.cell);
            match monster.archetype.attack_style() {
                AttackStyle::Melee { radius } => {
                    if distance <= radius {
                        out.push(Command::MonsterStrike {
                            monster: monster.id,
                        });
                    }
                }
                AttackStyle::Ranged { range, .. } => {
                    if monster.projectile_in_flight.is_some() || distance > range {
                        continue;
                    }
                    if self
                        .config
                        .sight_gate
                        .permits(is_sight_clear(monster.cell, player.cell))
                    {
                        out.push(Command::FireProjectile {
                            monster: monster.id,
                            target: player.cell,
                        });
                    }
                }
            }
        }
    }
}
