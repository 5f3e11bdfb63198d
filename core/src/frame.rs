//! Read-only snapshots handed to the presentation layer after each tick.

use crate::{
    Archetype, CellCoord, Event, MonsterId, PickupSnapshot, PlayerSnapshot, ProjectileId,
    TileKind, WorldPoint,
};

/// Lifecycle state of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Ticks update the simulation.
    Running,
    /// Updates are suspended; frames are still emitted.
    Paused,
    /// The player was defeated.
    GameOver,
    /// The player reached a finish tile.
    Completed,
}

impl SessionState {
    /// Reports whether the session ended and only a restart can resume it.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Completed)
    }
}

/// Player-facing outcome reported alongside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RewardEvent {
    /// A monster was eliminated and dropped its reward.
    MonsterEliminated {
        /// Identifier of the eliminated monster.
        monster: MonsterId,
        /// Cell the reward dropped on.
        cell: CellCoord,
        /// Value of the dropped reward.
        value: u32,
    },
    /// A chest was opened.
    ChestOpened {
        /// Cell of the chest.
        cell: CellCoord,
        /// Currency granted.
        value: u32,
    },
    /// A dropped reward was collected.
    PickupCollected {
        /// Cell of the pickup.
        cell: CellCoord,
        /// Currency granted.
        value: u32,
    },
    /// The player stepped on a hazard.
    HazardStepped {
        /// Cell of the hazard.
        cell: CellCoord,
        /// Damage applied.
        damage: u32,
    },
}

impl RewardEvent {
    /// Extracts the player-facing outcome carried by a world event, if any.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match *event {
            Event::MonsterEliminated {
                monster,
                cell,
                reward,
            } => Some(Self::MonsterEliminated {
                monster,
                cell,
                value: reward,
            }),
            Event::ChestOpened { cell, value } => Some(Self::ChestOpened { cell, value }),
            Event::PickupCollected { cell, value, .. } => {
                Some(Self::PickupCollected { cell, value })
            }
            Event::HazardStepped { cell, damage } => Some(Self::HazardStepped { cell, damage }),
            _ => None,
        }
    }
}

/// Kind of entity drawn in a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameEntityKind {
    /// The player.
    Player,
    /// A monster of the given archetype.
    Monster {
        /// Identifier of the monster.
        id: MonsterId,
        /// Family of the monster.
        archetype: Archetype,
    },
}

/// Entity visible through the camera window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameEntity {
    /// What the entity is.
    pub kind: FrameEntityKind,
    /// Grid cell occupied by the entity.
    pub cell: CellCoord,
    /// Center of the entity in world units.
    pub position: WorldPoint,
    /// Remaining health as a fraction of maximum.
    pub health_fraction: f32,
}

/// Projectile visible through the camera window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameProjectile {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Position in world units.
    pub position: WorldPoint,
}

/// Owned snapshot of everything the presentation layer may draw.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    /// Number of ticks executed by the session.
    pub tick: u64,
    /// Session lifecycle state after the tick.
    pub state: SessionState,
    /// Upper-left cell of the camera window.
    pub origin: CellCoord,
    /// Edge length of the camera window, in cells.
    pub window_size: u32,
    /// Edge length of a tile, in world units.
    pub tile_size: f32,
    /// Window tiles in row-major order; `None` pads cells beyond the grid.
    pub tiles: Vec<Option<TileKind>>,
    /// Visible player and monsters.
    pub entities: Vec<FrameEntity>,
    /// Visible projectiles.
    pub projectiles: Vec<FrameProjectile>,
    /// Visible reward pickups.
    pub pickups: Vec<PickupSnapshot>,
    /// Player status for HUD display.
    pub player: PlayerSnapshot,
    /// Outcomes produced during the tick.
    pub rewards: Vec<RewardEvent>,
}

impl RenderFrame {
    /// Reports whether the session has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Tile shown at a window-relative position, `None` for void or outside.
    #[must_use]
    pub fn tile_at(&self, column: u32, row: u32) -> Option<TileKind> {
        if column >= self.window_size || row >= self.window_size {
            return None;
        }
        let index = row as usize * self.window_size as usize + column as usize;
        self.tiles.get(index).copied().flatten()
    }
}

/// Messages emitted by the session loop to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// State changed during a tick.
    Frame(RenderFrame),
    /// The loop stopped and will emit nothing further.
    Closed {
        /// State the session ended in.
        state: SessionState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_player_facing_events_become_rewards() {
        let cell = CellCoord::new(2, 3);
        assert_eq!(
            RewardEvent::from_event(&Event::ChestOpened { cell, value: 5 }),
            Some(RewardEvent::ChestOpened { cell, value: 5 })
        );
        assert_eq!(RewardEvent::from_event(&Event::PlayerDefeated), None);
    }

    #[test]
    fn terminal_states_end_the_session() {
        assert!(SessionState::GameOver.is_terminal());
        assert!(SessionState::Completed.is_terminal());
        assert!(!SessionState::Paused.is_terminal());
        assert!(!SessionState::Running.is_terminal());
    }
}
