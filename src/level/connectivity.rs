use std::collections::VecDeque;

use crate::types::{Cell, Rect, Vec2};

use super::grid::{Grid, Mask};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Passage {
    AllOpen,
    BossLocked,
}

impl Passage {
    fn allows(self, cell: Cell) -> bool {
        match self {
            Passage::AllOpen => cell.is_open(),
            Passage::BossLocked => matches!(cell, Cell::Floor | Cell::Door),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Reachability {
    visited: Mask,
    count: usize,
}

impl Reachability {
    pub fn is_visited(&self, x: i32, y: i32) -> bool {
        self.visited.get(x, y)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.visited.get(pos.x, pos.y)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn touches(&self, rect: &Rect) -> bool {
        rect.cells().any(|pos| self.contains(pos))
    }
}

/// 4-directional BFS from `start`. A start cell that is not passable yields
/// an empty set.
pub fn flood(grid: &Grid, start: Vec2, passage: Passage) -> Reachability {
    let mut visited = Mask::new(grid.width(), grid.height());
    let mut count = 0;
    if !grid.in_bounds(start.x, start.y) || !passage.allows(grid.at(start)) {
        return Reachability { visited, count };
    }

    let mut queue = VecDeque::new();
    visited.set(start.x, start.y);
    count += 1;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for next in [
            pos.offset(-1, 0),
            pos.offset(1, 0),
            pos.offset(0, -1),
            pos.offset(0, 1),
        ] {
            if visited.get(next.x, next.y) || !passage.allows(grid.at(next)) {
                continue;
            }
            visited.set(next.x, next.y);
            count += 1;
            queue.push_back(next);
        }
    }

    Reachability { visited, count }
}

pub fn nearest_visited_floor(
    grid: &Grid,
    reach: &Reachability,
    target: Vec2,
    excluded: &[Rect],
    limit: usize,
) -> Vec<Vec2> {
    let mut candidates: Vec<(i64, i32, i32)> = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if !reach.is_visited(x, y) || grid.get(x, y) != Cell::Floor {
                continue;
            }
            if excluded.iter().any(|rect| rect.contains(x, y)) {
                continue;
            }
            let pos = Vec2::new(x, y);
            candidates.push((pos.dist2(target), y, x));
        }
    }
    candidates.sort_unstable();
    candidates.truncate(limit);
    candidates
        .into_iter()
        .map(|(_, y, x)| Vec2::new(x, y))
        .collect()
}
