//! Stat records and map definitions handed to the core by the data layer.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ArchetypeId, CellCoord, ItemId, SessionConfig, StrategyKind};

/// Monster families. Presentation details such as sprites belong to adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Slow blob that wanders at random.
    Slime,
    /// Erratic flyer.
    Bat,
    /// Relentless melee hunter.
    Knight,
    /// Ranged attacker that looses arrows.
    Archer,
}

/// How an archetype deals damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Strikes targets within `radius` cells (Chebyshev).
    Melee {
        /// Reach measured in cells.
        radius: u32,
    },
    /// Fires projectiles at targets within `range` cells (Chebyshev).
    Ranged {
        /// Reach and projectile travel limit, in tiles.
        range: u32,
        /// Projectile speed in tiles per second.
        speed: u32,
    },
}

impl Archetype {
    /// Attack behaviour shared by every monster of the archetype.
    #[must_use]
    pub const fn attack_style(self) -> AttackStyle {
        match self {
            Self::Slime | Self::Bat | Self::Knight => AttackStyle::Melee { radius: 1 },
            Self::Archer => AttackStyle::Ranged { range: 5, speed: 8 },
        }
    }

    /// Movement policy used when the stat record does not override it.
    #[must_use]
    pub const fn default_strategy(self) -> StrategyKind {
        match self {
            Self::Slime => StrategyKind::Random,
            Self::Bat => StrategyKind::Omnidirectional,
            Self::Knight => StrategyKind::Pursuit,
            Self::Archer => StrategyKind::Straight,
        }
    }
}

/// Stat record describing one monster archetype.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    /// Family the record belongs to.
    pub archetype: Archetype,
    /// Starting and maximum health.
    pub max_health: u32,
    /// Damage dealt per strike.
    pub power: u32,
    /// Reward dropped on elimination.
    pub cost: u32,
    /// Minimum time between two moves.
    pub move_cooldown: Duration,
    /// Minimum time between two attacks.
    pub attack_cooldown: Duration,
    /// Movement policy override.
    pub strategy: Option<StrategyKind>,
}

impl MonsterRecord {
    /// Movement policy assigned to monsters built from this record.
    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
            .unwrap_or_else(|| self.archetype.default_strategy())
    }
}

/// Effect carried by an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Adds to the player's strike damage.
    Weapon {
        /// Extra damage per strike.
        power_bonus: u32,
    },
    /// Absorbs incoming damage.
    Armor {
        /// Damage absorbed per hit.
        defense: u32,
    },
    /// Consumable that restores health.
    Potion {
        /// Health restored per potion.
        heal: u32,
    },
}

/// Catalog entry for an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Display identifier handed to presentation.
    pub name: String,
    /// Effect of the item.
    pub kind: ItemKind,
}

/// Items equipped by the player when the session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    /// Equipped weapon.
    pub weapon: Option<ItemId>,
    /// Equipped armor.
    pub armor: Option<ItemId>,
    /// Potion type carried.
    pub potion: Option<ItemId>,
    /// Number of potions carried.
    pub potion_count: u32,
}

/// Stat record describing the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Starting and maximum health.
    pub max_health: u32,
    /// Base damage per strike.
    pub power: u32,
    /// Starting equipment.
    pub loadout: Loadout,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            max_health: 20,
            power: 2,
            loadout: Loadout::default(),
        }
    }
}

/// Already-parsed map handed over by the data layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    /// Tile codes in row-major order; negative codes place monsters.
    pub tiles: Vec<Vec<i32>>,
    /// Additional monster placements keyed by cell.
    pub placements: BTreeMap<CellCoord, ArchetypeId>,
    /// Currency granted by each chest.
    pub chest_reward: u32,
}

/// Stat lookups resolved before the session starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCatalog {
    /// Player stats and loadout.
    pub player: PlayerRecord,
    /// Monster records keyed by archetype id.
    pub monsters: BTreeMap<ArchetypeId, MonsterRecord>,
    /// Item records keyed by item id.
    pub items: BTreeMap<ItemId, ItemRecord>,
}

impl StatCatalog {
    /// Looks up a monster record.
    #[must_use]
    pub fn monster(&self, id: ArchetypeId) -> Option<&MonsterRecord> {
        self.monsters.get(&id)
    }

    /// Looks up an item record.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.get(&id)
    }
}

/// Everything a session needs to (re)build its world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionData {
    /// Parsed map.
    pub map: MapDefinition,
    /// Stat lookups.
    pub catalog: StatCatalog,
    /// Session tunables.
    pub config: SessionConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_strategy_defaults_to_archetype() {
        let mut record = MonsterRecord {
            archetype: Archetype::Knight,
            max_health: 4,
            power: 1,
            cost: 3,
            move_cooldown: Duration::from_millis(300),
            attack_cooldown: Duration::from_millis(500),
            strategy: None,
        };
        assert_eq!(record.strategy(), StrategyKind::Pursuit);

        record.strategy = Some(StrategyKind::Random);
        assert_eq!(record.strategy(), StrategyKind::Random);
    }

    #[test]
    fn only_archers_attack_at_range() {
        assert!(matches!(
            Archetype::Archer.attack_style(),
            AttackStyle::Ranged { .. }
        ));
        for archetype in [Archetype::Slime, Archetype::Bat, Archetype::Knight] {
            assert_eq!(archetype.attack_style(), AttackStyle::Melee { radius: 1 });
        }
    }
}
