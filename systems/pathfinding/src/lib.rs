#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* search over 4-connected grid cells with unit step cost.
//!
//! The search owns its scratch buffers so repeated queries on the same grid
//! reuse allocations. Paths are recomputed on every call; nothing is cached
//! between queries.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use gridfall_core::{CellCoord, Direction};

/// Reusable A* search workspace.
#[derive(Debug, Default)]
pub struct Pathfinder {
    open: BinaryHeap<Reverse<OpenNode>>,
    best_cost: Vec<u32>,
    came_from: Vec<Option<usize>>,
    sequence: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenNode {
    estimate: u32,
    sequence: u64,
    cost: u32,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.estimate
            .cmp(&other.estimate)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Pathfinder {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a shortest 4-connected path from `start` to `goal`.
    ///
    /// The returned path includes both endpoints in travel order. It is
    /// `[start]` when the endpoints coincide and empty when either endpoint
    /// lies outside the grid or is blocked, or when no route exists.
    pub fn find_path<F>(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        columns: u32,
        rows: u32,
        is_blocked: F,
    ) -> Vec<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        let (Some(start_index), Some(goal_index)) = (
            cell_index(start, columns, rows),
            cell_index(goal, columns, rows),
        ) else {
            return Vec::new();
        };
        if is_blocked(start) || is_blocked(goal) {
            return Vec::new();
        }
        if start_index == goal_index {
            return vec![start];
        }

        self.reset(columns as usize * rows as usize);
        self.best_cost[start_index] = 0;
        self.push(start_index, 0, start.manhattan_distance(goal));

        while let Some(Reverse(node)) = self.open.pop() {
            if node.cost > self.best_cost[node.index] {
                continue;
            }
            if node.index == goal_index {
                return self.reconstruct(goal_index, columns);
            }

            let current = index_cell(node.index, columns);
            for direction in Direction::CARDINALS {
                let Some(next) = current.offset_within(direction.offset(), columns, rows) else {
                    continue;
                };
                if is_blocked(next) {
                    continue;
                }
                let Some(next_index) = cell_index(next, columns, rows) else {
                    continue;
                };

                let cost = node.cost + 1;
                if cost < self.best_cost[next_index] {
                    self.best_cost[next_index] = cost;
                    self.came_from[next_index] = Some(node.index);
                    self.push(next_index, cost, cost + next.manhattan_distance(goal));
                }
            }
        }

        Vec::new()
    }

    fn reset(&mut self, cells: usize) {
        self.open.clear();
        self.best_cost.clear();
        self.best_cost.resize(cells, u32::MAX);
        self.came_from.clear();
        self.came_from.resize(cells, None);
        self.sequence = 0;
    }

    fn push(&mut self, index: usize, cost: u32, estimate: u32) {
        self.open.push(Reverse(OpenNode {
            estimate,
            sequence: self.sequence,
            cost,
            index,
        }));
        self.sequence += 1;
    }

    fn reconstruct(&self, goal_index: usize, columns: u32) -> Vec<CellCoord> {
        let mut path = vec![index_cell(goal_index, columns)];
        let mut current = goal_index;
        while let Some(previous) = self.came_from[current] {
            path.push(index_cell(previous, columns));
            current = previous;
        }
        path.reverse();
        path
    }
}

fn cell_index(cell: CellCoord, columns: u32, rows: u32) -> Option<usize> {
    if cell.column() >= columns || cell.row() >= rows {
        return None;
    }
    Some(cell.row() as usize * columns as usize + cell.column() as usize)
}

fn index_cell(index: usize, columns: u32) -> CellCoord {
    let columns = columns as usize;
    CellCoord::new((index % columns) as u32, (index / columns) as u32)
}
