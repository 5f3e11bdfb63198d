//! TOML map files describing a complete session.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use gridfall_core::{
    Archetype, ArchetypeId, CellCoord, ItemId, ItemKind, ItemRecord, Loadout, MapDefinition,
    MonsterRecord, PlayerRecord, SessionConfig, SessionData, StatCatalog, StrategyKind,
};
use gridfall_session::{LoadError, MapSupplier};

const SUPPORTED_MAP_VERSION: u32 = 1;

/// Reads a map file from disk when the loader thread asks for it.
#[derive(Clone, Debug)]
pub(crate) struct TomlMapSupplier {
    path: PathBuf,
}

impl TomlMapSupplier {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MapSupplier for TomlMapSupplier {
    fn load(&mut self) -> Result<SessionData, LoadError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_map(&contents).map_err(|error| LoadError::Parse {
            path: self.path.clone(),
            message: format!("{error:#}"),
        })
    }
}

#[derive(Debug, serde::Deserialize)]
struct MapFile {
    version: u32,
    #[serde(default)]
    chest_reward: u32,
    tiles: Vec<Vec<i32>>,
    #[serde(default)]
    placements: Vec<PlacementEntry>,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    player: Option<PlayerEntry>,
    #[serde(default)]
    monsters: BTreeMap<String, MonsterEntry>,
    #[serde(default)]
    items: BTreeMap<String, ItemEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct PlacementEntry {
    column: u32,
    row: u32,
    archetype: u32,
}

#[derive(Debug, serde::Deserialize)]
struct PlayerEntry {
    max_health: u32,
    power: u32,
    #[serde(default)]
    loadout: LoadoutEntry,
}

#[derive(Debug, Default, serde::Deserialize)]
struct LoadoutEntry {
    weapon: Option<u32>,
    armor: Option<u32>,
    potion: Option<u32>,
    #[serde(default)]
    potion_count: u32,
}

#[derive(Debug, serde::Deserialize)]
struct MonsterEntry {
    archetype: ArchetypeName,
    max_health: u32,
    power: u32,
    cost: u32,
    move_cooldown_ms: u64,
    attack_cooldown_ms: u64,
    strategy: Option<StrategyName>,
}

#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum ArchetypeName {
    Slime,
    Bat,
    Knight,
    Archer,
}

impl From<ArchetypeName> for Archetype {
    fn from(name: ArchetypeName) -> Self {
        match name {
            ArchetypeName::Slime => Self::Slime,
            ArchetypeName::Bat => Self::Bat,
            ArchetypeName::Knight => Self::Knight,
            ArchetypeName::Archer => Self::Archer,
        }
    }
}

#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyName {
    Random,
    Omnidirectional,
    Straight,
    Pursuit,
}

impl From<StrategyName> for StrategyKind {
    fn from(name: StrategyName) -> Self {
        match name {
            StrategyName::Random => Self::Random,
            StrategyName::Omnidirectional => Self::Omnidirectional,
            StrategyName::Straight => Self::Straight,
            StrategyName::Pursuit => Self::Pursuit,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ItemEntry {
    Weapon { name: String, power_bonus: u32 },
    Armor { name: String, defense: u32 },
    Potion { name: String, heal: u32 },
}

impl From<ItemEntry> for ItemRecord {
    fn from(entry: ItemEntry) -> Self {
        let (name, kind) = match entry {
            ItemEntry::Weapon { name, power_bonus } => (name, ItemKind::Weapon { power_bonus }),
            ItemEntry::Armor { name, defense } => (name, ItemKind::Armor { defense }),
            ItemEntry::Potion { name, heal } => (name, ItemKind::Potion { heal }),
        };
        Self { name, kind }
    }
}

/// Parses map file contents into session inputs.
///
/// Only the file's own structure is checked here; map semantics such as
/// unknown archetypes are reported when the world is built.
pub(crate) fn parse_map(contents: &str) -> Result<SessionData> {
    let file: MapFile = toml::from_str(contents).context("failed to parse map toml contents")?;
    if file.version != SUPPORTED_MAP_VERSION {
        bail!(
            "unsupported map version {}; expected {}",
            file.version,
            SUPPORTED_MAP_VERSION
        );
    }

    let mut placements = BTreeMap::new();
    for entry in file.placements {
        let cell = CellCoord::new(entry.column, entry.row);
        if placements
            .insert(cell, ArchetypeId::new(entry.archetype))
            .is_some()
        {
            bail!("map places two monsters on {cell}");
        }
    }

    let mut monsters = BTreeMap::new();
    for (key, entry) in file.monsters {
        let id = parse_key(&key, "monster")?;
        let _ = monsters.insert(
            ArchetypeId::new(id),
            MonsterRecord {
                archetype: entry.archetype.into(),
                max_health: entry.max_health,
                power: entry.power,
                cost: entry.cost,
                move_cooldown: Duration::from_millis(entry.move_cooldown_ms),
                attack_cooldown: Duration::from_millis(entry.attack_cooldown_ms),
                strategy: entry.strategy.map(StrategyKind::from),
            },
        );
    }

    let mut items = BTreeMap::new();
    for (key, entry) in file.items {
        let id = parse_key(&key, "item")?;
        let _ = items.insert(ItemId::new(id), ItemRecord::from(entry));
    }

    let player = match file.player {
        Some(entry) => PlayerRecord {
            max_health: entry.max_health,
            power: entry.power,
            loadout: Loadout {
                weapon: entry.loadout.weapon.map(ItemId::new),
                armor: entry.loadout.armor.map(ItemId::new),
                potion: entry.loadout.potion.map(ItemId::new),
                potion_count: entry.loadout.potion_count,
            },
        },
        None => PlayerRecord::default(),
    };

    Ok(SessionData {
        map: MapDefinition {
            tiles: file.tiles,
            placements,
            chest_reward: file.chest_reward,
        },
        catalog: StatCatalog {
            player,
            monsters,
            items,
        },
        config: file.session,
    })
}

fn parse_key(key: &str, table: &str) -> Result<u32> {
    key.parse()
        .with_context(|| format!("{table} id `{key}` is not a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use gridfall_core::{ManualClock, SightGate};
    use gridfall_session::GameLoop;

    use super::*;

    fn read_map(path: &Path) -> Result<SessionData> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read map file at {}", path.display()))?;
        parse_map(&contents)
    }

    fn bundled_map() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("maps/dungeon.toml")
    }

    #[test]
    fn bundled_map_builds_a_session() {
        let data = read_map(&bundled_map()).expect("bundled map parses");

        assert_eq!(data.config.tick_rate, 20);
        assert_eq!(data.config.sight_gate, SightGate::RequireBlocked);
        assert_eq!(data.map.chest_reward, 5);
        assert_eq!(
            data.map.placements.get(&CellCoord::new(10, 6)),
            Some(&ArchetypeId::new(1))
        );
        assert_eq!(
            data.catalog
                .monster(ArchetypeId::new(4))
                .map(MonsterRecord::strategy),
            Some(StrategyKind::Random)
        );
        assert_eq!(
            data.catalog.item(ItemId::new(3)).map(|item| item.kind),
            Some(ItemKind::Potion { heal: 6 })
        );

        let session = GameLoop::new(data, ManualClock::new()).expect("bundled map is valid");
        assert_eq!(session.tick_count(), 0);
    }

    #[test]
    fn minimal_map_falls_back_to_defaults() {
        let data = parse_map("version = 1\ntiles = [[3, 0, 4]]\n").expect("minimal map");

        assert_eq!(data.config, SessionConfig::default());
        assert_eq!(data.catalog.player, PlayerRecord::default());
        assert!(data.map.placements.is_empty());
    }

    #[test]
    fn unsupported_versions_are_rejected() {
        let error = parse_map("version = 2\ntiles = [[3]]\n").expect_err("version 2");
        assert!(format!("{error:#}").contains("unsupported map version 2"));
    }

    #[test]
    fn non_numeric_table_keys_are_rejected() {
        let contents = r#"
version = 1
tiles = [[3]]

[items.sword]
kind = "weapon"
name = "sword"
power_bonus = 1
"#;
        let error = parse_map(contents).expect_err("named item key");
        assert!(format!("{error:#}").contains("item id `sword`"));
    }

    #[test]
    fn supplier_reports_missing_files_as_io_errors() {
        let mut supplier = TomlMapSupplier::new(PathBuf::from("maps/does-not-exist.toml"));
        assert!(matches!(supplier.load(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn supplier_reports_malformed_files_as_parse_errors() {
        let path = std::env::temp_dir()
            .join(format!("gridfall-broken-{}.toml", std::process::id()));
        fs::write(&path, "version = \"one\"").expect("temp file written");

        let result = TomlMapSupplier::new(path.clone()).load();
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }
}
