//! Dense tile grid owned by the world.

use gridfall_core::{CellCoord, TileKind};

/// Rectangular tile layout stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl Grid {
    /// Builds a grid from row-major tiles. `tiles.len()` must equal `columns * rows`.
    pub(crate) fn from_tiles(columns: u32, rows: u32, tiles: Vec<TileKind>) -> Self {
        debug_assert_eq!(tiles.len(), columns as usize * rows as usize);
        Self {
            columns,
            rows,
            tiles,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell).and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether an entity may stand on the cell. Cells outside are not walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(TileKind::is_walkable)
    }

    /// Reports whether the cell blocks movement and path searches.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellCoord) -> bool {
        self.tile(cell).map_or(true, TileKind::is_obstacle)
    }

    /// Reports whether the cell interrupts sight. Cells outside never do.
    #[must_use]
    pub fn blocks_sight(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(TileKind::blocks_sight)
    }

    /// Iterates every cell paired with its tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }

    pub(crate) fn set(&mut self, cell: CellCoord, tile: TileKind) {
        if let Some(slot) = self.index(cell).and_then(|index| self.tiles.get_mut(index)) {
            *slot = tile;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
