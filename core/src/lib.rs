#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridfall engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The session turns player intents
//! into [`Command`] values, the world executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values describing what changed.
//! Systems read immutable snapshots and respond exclusively with new command
//! batches, so a whole tick can be replayed from its inputs.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

mod catalog;
mod clock;
mod config;
mod frame;

pub use catalog::{
    Archetype, AttackStyle, ItemKind, ItemRecord, Loadout, MapDefinition, MonsterRecord,
    PlayerRecord, SessionData, StatCatalog,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{SessionConfig, SightGate};
pub use frame::{
    FrameEntity, FrameEntityKind, FrameProjectile, Notification, RenderFrame, RewardEvent,
    SessionState,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player step one cell in the given direction.
    StepPlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the player open every adjacent chest.
    Interact,
    /// Requests that the player drink one potion from the loadout.
    UseItem,
    /// Requests that a monster move by the proposed offset.
    StepMonster {
        /// Identifier of the monster attempting to move.
        monster: MonsterId,
        /// Displacement proposed by the monster's movement strategy.
        offset: Offset,
    },
    /// Requests that the player strike the listed monsters.
    PlayerStrike {
        /// Monsters selected by the combat resolver.
        targets: Vec<MonsterId>,
    },
    /// Requests that a melee monster strike the player.
    MonsterStrike {
        /// Identifier of the attacking monster.
        monster: MonsterId,
    },
    /// Requests that a ranged monster loose a projectile toward a cell.
    FireProjectile {
        /// Identifier of the attacking monster.
        monster: MonsterId,
        /// Cell the projectile is aimed at.
        target: CellCoord,
    },
    /// Advances every projectile in flight by the provided delta time.
    AdvanceProjectiles {
        /// Duration of simulated flight time.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a monster moved between two cells.
    MonsterMoved {
        /// Identifier of the monster that moved.
        monster: MonsterId,
        /// Cell the monster occupied before moving.
        from: CellCoord,
        /// Cell the monster occupies after moving.
        to: CellCoord,
    },
    /// Reports damage dealt to a monster.
    MonsterDamaged {
        /// Identifier of the damaged monster.
        monster: MonsterId,
        /// Damage applied by the strike.
        amount: u32,
        /// Health left after the strike.
        remaining: Health,
    },
    /// Reports that a monster was removed from the roster.
    MonsterEliminated {
        /// Identifier of the eliminated monster.
        monster: MonsterId,
        /// Last cell occupied by the monster.
        cell: CellCoord,
        /// Reward value dropped by the monster.
        reward: u32,
    },
    /// Reports that a reward pickup appeared on the grid.
    PickupSpawned {
        /// Identifier allocated to the pickup.
        pickup: PickupId,
        /// Cell holding the pickup.
        cell: CellCoord,
        /// Currency granted when the pickup is collected.
        value: u32,
    },
    /// Reports that the player collected a pickup.
    PickupCollected {
        /// Identifier of the collected pickup.
        pickup: PickupId,
        /// Cell that held the pickup.
        cell: CellCoord,
        /// Currency granted by the pickup.
        value: u32,
    },
    /// Reports that a chest was opened and cleared to floor.
    ChestOpened {
        /// Cell of the opened chest.
        cell: CellCoord,
        /// Currency granted by the chest.
        value: u32,
    },
    /// Reports damage dealt to the player.
    PlayerDamaged {
        /// Origin of the damage.
        source: DamageSource,
        /// Damage applied after armor.
        amount: u32,
        /// Health left after the damage.
        remaining: Health,
    },
    /// Reports that the player restored health.
    PlayerHealed {
        /// Health restored.
        amount: u32,
        /// Health after healing.
        remaining: Health,
    },
    /// Reports that the player's health reached zero.
    PlayerDefeated,
    /// Reports that the player stepped onto a hazard tile.
    HazardStepped {
        /// Cell of the hazard.
        cell: CellCoord,
        /// Damage dealt by the hazard.
        damage: u32,
    },
    /// Reports that the player reached a finish tile.
    FinishReached {
        /// Finish cell the player stepped on.
        cell: CellCoord,
    },
    /// Confirms that a projectile was fired.
    ProjectileFired {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Monster that fired it.
        monster: MonsterId,
        /// Cell it was aimed at.
        target: CellCoord,
    },
    /// Reports that a projectile exhausted its range and was removed.
    ProjectileExpired {
        /// Identifier of the expired projectile.
        projectile: ProjectileId,
    },
}

/// Origin of damage dealt to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// Melee strike by a monster.
    Melee(MonsterId),
    /// Projectile fired by a monster.
    Ranged(MonsterId),
    /// Hazard tile underfoot.
    Hazard,
}

/// Discrete inputs produced by the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Step the player one cell.
    Move(Direction),
    /// Strike every monster in range.
    Attack,
    /// Open adjacent chests.
    Interact,
    /// Drink a potion.
    UseItem,
    /// Suspend updates, for example while a menu is open.
    Pause,
    /// Resume updates after a pause.
    Resume,
    /// Rebuild the session from its original inputs.
    Restart,
    /// Leave the session loop.
    Exit,
}

/// Eight-way movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward decreasing rows and increasing columns.
    NorthEast,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing rows and columns.
    SouthEast,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing rows and decreasing columns.
    SouthWest,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward decreasing rows and columns.
    NorthWest,
}

impl Direction {
    /// The four cardinal directions in clockwise order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset travelled when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> Offset {
        match self {
            Self::North => Offset::new(0, -1),
            Self::NorthEast => Offset::new(1, -1),
            Self::East => Offset::new(1, 0),
            Self::SouthEast => Offset::new(1, 1),
            Self::South => Offset::new(0, 1),
            Self::SouthWest => Offset::new(-1, 1),
            Self::West => Offset::new(-1, 0),
            Self::NorthWest => Offset::new(-1, -1),
        }
    }
}

/// Signed displacement between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    dx: i32,
    dy: i32,
}

impl Offset {
    /// Displacement that keeps an entity in place.
    pub const ZERO: Offset = Offset::new(0, 0);

    /// Creates a new offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Column delta.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Row delta.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the offset leaves the entity in place.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Reports whether the offset reaches at most one cell on each axis.
    #[must_use]
    pub const fn is_single_step(&self) -> bool {
        self.dx.abs() <= 1 && self.dy.abs() <= 1
    }
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a reward pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a monster stat record in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Creates a new archetype identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an item record in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance between two cell coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Applies an offset, returning `None` when the result leaves the grid.
    #[must_use]
    pub fn offset_within(self, offset: Offset, columns: u32, rows: u32) -> Option<CellCoord> {
        let column = i64::from(self.column) + i64::from(offset.dx());
        let row = i64::from(self.row) + i64::from(offset.dy());
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Offset that leads from this cell to `other`.
    #[must_use]
    pub fn offset_to(self, other: CellCoord) -> Offset {
        Offset::new(
            other.column as i32 - self.column as i32,
            other.row as i32 - self.row as i32,
        )
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Continuous position measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Center of the provided cell for the given tile edge length.
    #[must_use]
    pub fn cell_center(cell: CellCoord, tile_size: f32) -> Self {
        Self {
            x: (cell.column() as f32 + 0.5) * tile_size,
            y: (cell.row() as f32 + 0.5) * tile_size,
        }
    }

    /// Cell containing the point, if it is not left of or above the grid.
    #[must_use]
    pub fn containing_cell(&self, tile_size: f32) -> Option<CellCoord> {
        if tile_size <= 0.0 || self.x < 0.0 || self.y < 0.0 {
            return None;
        }
        Some(CellCoord::new(
            (self.x / tile_size) as u32,
            (self.y / tile_size) as u32,
        ))
    }
}

/// Hit points carried by an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Removes damage, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Restores health without exceeding `max`.
    #[must_use]
    pub fn restore(self, amount: u32, max: Health) -> Self {
        Self(self.0.saturating_add(amount).min(max.0))
    }

    /// Fraction of `max` this value represents, in `0.0..=1.0`.
    #[must_use]
    pub fn fraction_of(&self, max: Health) -> f32 {
        if max.0 == 0 {
            return 0.0;
        }
        (self.0 as f32 / max.0 as f32).clamp(0.0, 1.0)
    }
}

/// Classification of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain walkable ground.
    Floor,
    /// Opaque obstacle.
    Wall,
    /// Unopened chest; blocks movement but not sight.
    Chest,
    /// Player start cell.
    Start,
    /// Terminal cell that completes the session.
    Finish,
    /// Impassable but transparent gap.
    Chasm,
    /// Walkable tile that damages whoever steps on it.
    Hazard,
}

impl TileKind {
    /// Decodes a non-negative tile code. Negative codes are monster placements.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Floor),
            1 => Some(Self::Wall),
            2 => Some(Self::Chest),
            3 => Some(Self::Start),
            4 => Some(Self::Finish),
            5 => Some(Self::Chasm),
            6 => Some(Self::Hazard),
            _ => None,
        }
    }

    /// Numeric code used by map suppliers.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Floor => 0,
            Self::Wall => 1,
            Self::Chest => 2,
            Self::Start => 3,
            Self::Finish => 4,
            Self::Chasm => 5,
            Self::Hazard => 6,
        }
    }

    /// Reports whether entities may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Start | Self::Finish | Self::Hazard)
    }

    /// Reports whether the tile stops path searches and entity movement.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        !self.is_walkable()
    }

    /// Reports whether the tile interrupts line of sight.
    #[must_use]
    pub const fn blocks_sight(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Movement policies a monster may be assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Uniform choice among the four cardinal directions.
    Random,
    /// Uniform choice among the eight neighbours.
    Omnidirectional,
    /// Random axis followed by a random sign.
    Straight,
    /// Shortest-path pursuit of the player.
    Pursuit,
}

/// Immutable representation of the player used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Cell occupied by the player.
    pub cell: CellCoord,
    /// Current health.
    pub health: Health,
    /// Maximum health.
    pub max_health: Health,
    /// Damage dealt per strike, weapon included.
    pub power: u32,
    /// Damage absorbed per incoming hit.
    pub defense: u32,
    /// Currency gathered from chests and pickups.
    pub currency: u32,
    /// Number of monsters eliminated.
    pub kills: u32,
    /// Sum of the costs of eliminated monsters.
    pub score: u32,
    /// Potions left in the loadout.
    pub potions: u32,
    /// Remaining time before the player may step again.
    pub move_ready_in: Duration,
    /// Remaining time before the player may strike again.
    pub attack_ready_in: Duration,
}

impl PlayerSnapshot {
    /// Reports whether the player is still standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }

    /// Reports whether the attack cooldown elapsed.
    #[must_use]
    pub const fn attack_ready(&self) -> bool {
        self.attack_ready_in.is_zero()
    }
}

/// Immutable representation of a single monster used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterSnapshot {
    /// Unique identifier assigned to the monster.
    pub id: MonsterId,
    /// Archetype the monster was built from.
    pub archetype: Archetype,
    /// Cell currently occupied by the monster.
    pub cell: CellCoord,
    /// Current health.
    pub health: Health,
    /// Maximum health.
    pub max_health: Health,
    /// Damage dealt per strike.
    pub power: u32,
    /// Reward dropped on elimination.
    pub cost: u32,
    /// Assigned movement policy.
    pub strategy: StrategyKind,
    /// Remaining time before the monster may move again.
    pub move_ready_in: Duration,
    /// Remaining time before the monster may attack again.
    pub attack_ready_in: Duration,
    /// Projectile of this monster still in flight, if any.
    pub projectile_in_flight: Option<ProjectileId>,
}

/// Read-only snapshot describing all monsters on the grid.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of monsters captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the roster was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Finds the snapshot for the given monster.
    #[must_use]
    pub fn get(&self, id: MonsterId) -> Option<&MonsterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Monster that fired the projectile.
    pub monster: MonsterId,
    /// Current position in world units.
    pub position: WorldPoint,
    /// Distance travelled so far in world units.
    pub traveled: f32,
    /// Distance after which the projectile expires.
    pub max_distance: f32,
}

/// Immutable representation of a reward lying on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickupSnapshot {
    /// Identifier allocated to the pickup.
    pub id: PickupId,
    /// Cell holding the pickup.
    pub cell: CellCoord,
    /// Currency granted on collection.
    pub value: u32,
}

/// Fatal problems detected while building a session from its inputs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The map contained no rows or no columns.
    #[error("map grid is empty")]
    EmptyGrid,
    /// A map row had a different length than the first row.
    #[error("map row {row} has {found} tiles, expected {expected}")]
    RaggedGrid {
        /// Offending row index.
        row: u32,
        /// Length of the first row.
        expected: u32,
        /// Length of the offending row.
        found: u32,
    },
    /// A tile code has no classification.
    #[error("unknown tile code {code} at {cell}")]
    UnknownTileCode {
        /// Cell carrying the code.
        cell: CellCoord,
        /// Unrecognised code.
        code: i32,
    },
    /// A placement referenced an archetype missing from the catalog.
    #[error("monster at {cell} references unknown archetype {archetype}")]
    UnknownArchetype {
        /// Cell of the placement.
        cell: CellCoord,
        /// Missing archetype id.
        archetype: ArchetypeId,
    },
    /// A placement lies outside the grid or on an obstacle.
    #[error("monster placement at {cell} is outside the walkable grid")]
    InvalidPlacement {
        /// Cell of the placement.
        cell: CellCoord,
    },
    /// The loadout referenced an item missing from the catalog.
    #[error("loadout references unknown item {item}")]
    UnknownItem {
        /// Missing item id.
        item: ItemId,
    },
    /// The loadout put an item in a slot of a different kind.
    #[error("item {item} cannot be equipped as {slot}")]
    ItemSlotMismatch {
        /// Item referenced by the loadout.
        item: ItemId,
        /// Slot the item was assigned to.
        slot: &'static str,
    },
    /// No cell could host the player.
    #[error("map has no walkable cell for the player")]
    NoWalkableCell,
    /// The player record would start the session already defeated.
    #[error("player record has zero max health")]
    ZeroHealthPlayer,
    /// A placed monster's record would start it already destroyed.
    #[error("monster at {cell} uses archetype {archetype} with zero max health")]
    ZeroHealthMonster {
        /// Cell of the placement.
        cell: CellCoord,
        /// Archetype whose record has no health.
        archetype: ArchetypeId,
    },
    /// A session setting is out of range.
    #[error("invalid session configuration: {0}")]
    InvalidSessionConfig(&'static str),
}

#[cfg(test)]
mod tests {
    use super::{ArchetypeId, CellCoord, Direction, Health, Offset, TileKind, WorldPoint};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn chebyshev_distance_takes_the_longer_axis() {
        let origin = CellCoord::new(2, 2);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(5, 3)), 3);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(1, 1)), 1);
        assert_eq!(origin.chebyshev_distance(origin), 0);
    }

    #[test]
    fn offset_within_rejects_cells_outside_grid() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.offset_within(Direction::North.offset(), 4, 4), None);
        assert_eq!(corner.offset_within(Direction::West.offset(), 4, 4), None);
        assert_eq!(
            corner.offset_within(Direction::SouthEast.offset(), 4, 4),
            Some(CellCoord::new(1, 1))
        );
        assert_eq!(
            CellCoord::new(3, 3).offset_within(Offset::new(1, 0), 4, 4),
            None
        );
    }

    #[test]
    fn tile_codes_classify_walkability_and_sight() {
        assert!(TileKind::Floor.is_walkable());
        assert!(TileKind::Hazard.is_walkable());
        assert!(TileKind::Wall.blocks_sight());
        assert!(TileKind::Chasm.is_obstacle());
        assert!(!TileKind::Chasm.blocks_sight());
        assert!(TileKind::Chest.is_obstacle());
        assert!(!TileKind::Chest.blocks_sight());
        assert_eq!(TileKind::from_code(7), None);
        for code in 0..=6 {
            let kind = TileKind::from_code(code).expect("known code");
            assert_eq!(kind.code(), code);
        }
    }

    #[test]
    fn health_restores_up_to_maximum() {
        let max = Health::new(10);
        assert_eq!(Health::new(7).restore(5, max), max);
        assert_eq!(Health::new(2).saturating_sub(5), Health::new(0));
        assert!((Health::new(5).fraction_of(max) - 0.5).abs() < f32::EPSILON);
        assert_eq!(Health::new(5).fraction_of(Health::new(0)), 0.0);
    }

    #[test]
    fn world_point_maps_back_to_its_cell() {
        let cell = CellCoord::new(3, 7);
        let center = WorldPoint::cell_center(cell, 32.0);
        assert_eq!(center.containing_cell(32.0), Some(cell));
        assert_eq!(WorldPoint::new(-1.0, 4.0).containing_cell(32.0), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn catalog_keys_round_trip_through_bincode() {
        assert_round_trip(&ArchetypeId::new(3));
        assert_round_trip(&CellCoord::new(5, 7));
    }
}
