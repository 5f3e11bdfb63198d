#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Square camera window that follows a tracked cell without leaving the grid.

use gridfall_core::CellCoord;

/// Fixed-size viewport clamped to the grid bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    window: u32,
    columns: u32,
    rows: u32,
    origin: CellCoord,
}

impl Camera {
    /// Creates a camera showing `window` cells per axis over a grid.
    #[must_use]
    pub const fn new(window: u32, columns: u32, rows: u32) -> Self {
        Self {
            window,
            columns,
            rows,
            origin: CellCoord::new(0, 0),
        }
    }

    /// Edge length of the window, in cells.
    #[must_use]
    pub const fn window_size(&self) -> u32 {
        self.window
    }

    /// Cells between the window center and its edge. Odd windows round down.
    #[must_use]
    pub const fn half_extent(&self) -> u32 {
        self.window / 2
    }

    /// Upper-left cell of the window.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Recomputes the origin so `center` sits as close to the middle as the
    /// grid allows.
    pub fn center_on(&mut self, center: CellCoord) {
        self.origin = CellCoord::new(
            clamp_axis(center.column(), self.half_extent(), self.columns, self.window),
            clamp_axis(center.row(), self.half_extent(), self.rows, self.window),
        );
    }

    /// Reports whether the cell falls inside the window.
    #[must_use]
    pub const fn is_in_view(&self, column: u32, row: u32) -> bool {
        column >= self.origin.column()
            && row >= self.origin.row()
            && column - self.origin.column() < self.window
            && row - self.origin.row() < self.window
    }

    /// Iterates the window row by row, yielding `None` for padding beyond the grid.
    pub fn window_cells(&self) -> impl Iterator<Item = Option<CellCoord>> + '_ {
        (0..self.window).flat_map(move |row| {
            (0..self.window).map(move |column| {
                let cell = CellCoord::new(self.origin.column() + column, self.origin.row() + row);
                (cell.column() < self.columns && cell.row() < self.rows).then_some(cell)
            })
        })
    }
}

fn clamp_axis(center: u32, half_extent: u32, extent: u32, window: u32) -> u32 {
    center
        .saturating_sub(half_extent)
        .min(extent.saturating_sub(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centers_when_space_allows() {
        let mut camera = Camera::new(5, 20, 20);
        camera.center_on(CellCoord::new(10, 7));
        assert_eq!(camera.origin(), CellCoord::new(8, 5));
        assert!(camera.is_in_view(10, 7));
        assert!(camera.is_in_view(12, 9));
        assert!(!camera.is_in_view(13, 9));
    }

    #[test]
    fn clamps_at_grid_edges() {
        let mut camera = Camera::new(5, 20, 10);
        camera.center_on(CellCoord::new(0, 0));
        assert_eq!(camera.origin(), CellCoord::new(0, 0));
        camera.center_on(CellCoord::new(19, 9));
        assert_eq!(camera.origin(), CellCoord::new(15, 5));
    }

    #[test]
    fn small_grids_pad_instead_of_indexing_outside() {
        let mut camera = Camera::new(4, 3, 2);
        camera.center_on(CellCoord::new(2, 1));
        assert_eq!(camera.origin(), CellCoord::new(0, 0));

        let cells: Vec<_> = camera.window_cells().collect();
        assert_eq!(cells.len(), 16);
        assert_eq!(cells.iter().flatten().count(), 6);
        assert_eq!(cells[3], None);
        assert_eq!(cells[5], Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn odd_windows_bias_low() {
        let camera = Camera::new(9, 30, 30);
        assert_eq!(camera.half_extent(), 4);
        assert_eq!(Camera::new(8, 30, 30).half_extent(), 4);
    }

    proptest! {
        #[test]
        fn origin_stays_within_grid(
            window in 1u32..16,
            columns in 1u32..64,
            rows in 1u32..64,
            column in 0u32..64,
            row in 0u32..64,
        ) {
            let mut camera = Camera::new(window, columns, rows);
            let center = CellCoord::new(column % columns, row % rows);
            camera.center_on(center);
            let origin = camera.origin();

            prop_assert!(origin.column() <= columns.saturating_sub(window));
            prop_assert!(origin.row() <= rows.saturating_sub(window));
            for cell in camera.window_cells().flatten() {
                prop_assert!(cell.column() < columns && cell.row() < rows);
            }
            if columns >= window && rows >= window {
                prop_assert!(camera.is_in_view(center.column(), center.row()));
            }
        }
    }
}
