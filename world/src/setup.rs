//! Builds a world from an already-parsed map and its stat catalog.

use std::collections::BTreeMap;

use gridfall_core::{
    ArchetypeId, CellCoord, ConfigError, Health, ItemId, ItemKind, Loadout, MapDefinition,
    MonsterId, SessionConfig, StatCatalog, TileKind,
};

use crate::{grid::Grid, Cooldown, Monster, Player, Rules, World};

impl World {
    /// Creates a world from the supplied map, catalog and session settings.
    ///
    /// Every configuration problem is fatal and reported as a [`ConfigError`];
    /// nothing is partially built.
    pub fn from_definition(
        map: &MapDefinition,
        catalog: &StatCatalog,
        config: &SessionConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (grid, mut placements) = parse_tiles(&map.tiles)?;
        for (&cell, &archetype) in &map.placements {
            if !grid.is_walkable(cell) {
                return Err(ConfigError::InvalidPlacement { cell });
            }
            let _ = placements.insert(cell, archetype);
        }

        let player_cell = locate_player(&grid, &placements)?;
        if placements.contains_key(&player_cell) {
            return Err(ConfigError::InvalidPlacement { cell: player_cell });
        }

        let mut monsters = Vec::with_capacity(placements.len());
        for (index, (cell, archetype_id)) in placements_row_major(&placements).enumerate() {
            let record = catalog
                .monster(archetype_id)
                .ok_or(ConfigError::UnknownArchetype {
                    cell,
                    archetype: archetype_id,
                })?;
            if record.max_health == 0 {
                return Err(ConfigError::ZeroHealthMonster {
                    cell,
                    archetype: archetype_id,
                });
            }
            monsters.push(Monster {
                id: MonsterId::new(index as u32),
                archetype: record.archetype,
                cell,
                health: Health::new(record.max_health),
                max_health: Health::new(record.max_health),
                power: record.power,
                cost: record.cost,
                strategy: record.strategy(),
                move_cooldown: Cooldown::new(record.move_cooldown),
                attack_cooldown: Cooldown::new(record.attack_cooldown),
                projectile: None,
            });
        }

        if catalog.player.max_health == 0 {
            return Err(ConfigError::ZeroHealthPlayer);
        }
        let equipment = resolve_loadout(&catalog.player.loadout, catalog)?;
        let max_health = Health::new(catalog.player.max_health);
        let player = Player {
            cell: player_cell,
            health: max_health,
            max_health,
            power: catalog.player.power.saturating_add(equipment.power_bonus),
            defense: equipment.defense,
            currency: 0,
            kills: 0,
            score: 0,
            potions: equipment.potions,
            potion_heal: equipment.potion_heal,
            move_cooldown: Cooldown::new(config.player_move_cooldown()),
            attack_cooldown: Cooldown::new(config.player_attack_cooldown()),
        };

        let chests: BTreeMap<CellCoord, u32> = grid
            .cells()
            .filter(|(_, tile)| *tile == TileKind::Chest)
            .map(|(cell, _)| (cell, map.chest_reward))
            .collect();

        tracing::debug!(
            columns = grid.columns(),
            rows = grid.rows(),
            monsters = monsters.len(),
            chests = chests.len(),
            player = %player_cell,
            "world built"
        );

        Ok(Self {
            grid,
            rules: Rules {
                tile_size: config.tile_size,
                hazard_damage: config.hazard_damage,
            },
            now: std::time::Duration::ZERO,
            player,
            monsters,
            pickups: Vec::new(),
            chests,
            projectiles: Vec::new(),
            next_pickup: 0,
            next_projectile: 0,
        })
    }
}

type Placements = BTreeMap<CellCoord, ArchetypeId>;

fn parse_tiles(rows: &[Vec<i32>]) -> Result<(Grid, Placements), ConfigError> {
    let expected = rows.first().map_or(0, Vec::len);
    if expected == 0 {
        return Err(ConfigError::EmptyGrid);
    }

    let mut tiles = Vec::with_capacity(expected * rows.len());
    let mut placements = BTreeMap::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(ConfigError::RaggedGrid {
                row: row_index as u32,
                expected: expected as u32,
                found: row.len() as u32,
            });
        }
        for (column_index, &code) in row.iter().enumerate() {
            let cell = CellCoord::new(column_index as u32, row_index as u32);
            if code < 0 {
                let _ = placements.insert(cell, ArchetypeId::new(code.unsigned_abs()));
                tiles.push(TileKind::Floor);
                continue;
            }
            let tile =
                TileKind::from_code(code).ok_or(ConfigError::UnknownTileCode { cell, code })?;
            tiles.push(tile);
        }
    }

    let grid = Grid::from_tiles(expected as u32, rows.len() as u32, tiles);
    Ok((grid, placements))
}

fn locate_player(grid: &Grid, placements: &Placements) -> Result<CellCoord, ConfigError> {
    if let Some((start, _)) = grid.cells().find(|(_, tile)| *tile == TileKind::Start) {
        return Ok(start);
    }
    grid.cells()
        .find(|(cell, tile)| tile.is_walkable() && !placements.contains_key(cell))
        .map(|(cell, _)| cell)
        .ok_or(ConfigError::NoWalkableCell)
}

/// `CellCoord` orders by column first, monsters are numbered row by row.
fn placements_row_major(
    placements: &Placements,
) -> impl Iterator<Item = (CellCoord, ArchetypeId)> {
    let mut ordered: Vec<(CellCoord, ArchetypeId)> = placements
        .iter()
        .map(|(cell, archetype)| (*cell, *archetype))
        .collect();
    ordered.sort_by_key(|(cell, _)| (cell.row(), cell.column()));
    ordered.into_iter()
}

struct Equipment {
    power_bonus: u32,
    defense: u32,
    potions: u32,
    potion_heal: u32,
}

fn resolve_loadout(loadout: &Loadout, catalog: &StatCatalog) -> Result<Equipment, ConfigError> {
    let lookup = |item: ItemId| {
        catalog
            .item(item)
            .map(|record| record.kind)
            .ok_or(ConfigError::UnknownItem { item })
    };

    let mut equipment = Equipment {
        power_bonus: 0,
        defense: 0,
        potions: 0,
        potion_heal: 0,
    };

    if let Some(item) = loadout.weapon {
        match lookup(item)? {
            ItemKind::Weapon { power_bonus } => equipment.power_bonus = power_bonus,
            _ => return Err(ConfigError::ItemSlotMismatch { item, slot: "weapon" }),
        }
    }
    if let Some(item) = loadout.armor {
        match lookup(item)? {
            ItemKind::Armor { defense } => equipment.defense = defense,
            _ => return Err(ConfigError::ItemSlotMismatch { item, slot: "armor" }),
        }
    }
    if let Some(item) = loadout.potion {
        match lookup(item)? {
            ItemKind::Potion { heal } => {
                equipment.potion_heal = heal;
                equipment.potions = loadout.potion_count;
            }
            _ => return Err(ConfigError::ItemSlotMismatch { item, slot: "potion" }),
        }
    }

    Ok(equipment)
}
