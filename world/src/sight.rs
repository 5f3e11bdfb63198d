//! Sampled line-of-sight test between two cells.

use gridfall_core::CellCoord;

use crate::grid::Grid;

/// Marches from `from` toward `to` in unit steps along the normalized
/// direction, taking `max(|dx|, |dy|)` samples rounded to the nearest cell.
///
/// Only intermediate cells are tested; samples that round onto either endpoint
/// or fall outside the grid never block.
pub(crate) fn line_of_sight_clear(grid: &Grid, from: CellCoord, to: CellCoord) -> bool {
    let dx = to.column() as f32 - from.column() as f32;
    let dy = to.row() as f32 - from.row() as f32;
    let samples = from.chebyshev_distance(to);
    if samples == 0 {
        return true;
    }

    let length = (dx * dx + dy * dy).sqrt();
    let (step_x, step_y) = (dx / length, dy / length);

    for index in 1..=samples {
        let x = (from.column() as f32 + step_x * index as f32).round();
        let y = (from.row() as f32 + step_y * index as f32).round();
        if x < 0.0 || y < 0.0 {
            continue;
        }

        let cell = CellCoord::new(x as u32, y as u32);
        if cell == from || cell == to {
            continue;
        }
        if grid.blocks_sight(cell) {
            return false;
        }
    }

    true
}
