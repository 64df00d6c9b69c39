use crate::rng::Rng;
use crate::types::{Cell, Vec2};

use super::grid::{Grid, Mask};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CornerStats {
    pub sealed: usize,
    pub opened: usize,
    pub unresolved: usize,
    pub passes: usize,
}

const RING: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

fn diagonal_touch(grid: &Grid, x: i32, y: i32) -> Option<([Vec2; 2], [Vec2; 2])> {
    let a = Vec2::new(x, y);
    let b = Vec2::new(x + 1, y);
    let c = Vec2::new(x, y + 1);
    let d = Vec2::new(x + 1, y + 1);
    let open = |pos: Vec2| grid.at(pos).is_open();
    if open(a) && open(d) && !open(b) && !open(c) {
        return Some(([a, d], [b, c]));
    }
    if open(b) && open(c) && !open(a) && !open(d) {
        return Some(([b, c], [a, d]));
    }
    None
}

pub fn count_diagonal_touches(grid: &Grid) -> usize {
    let mut total = 0;
    for y in 0..grid.height() - 1 {
        for x in 0..grid.width() - 1 {
            if diagonal_touch(grid, x, y).is_some() {
                total += 1;
            }
        }
    }
    total
}

/// Closing a simple point never splits its open neighbourhood: all open
/// orthogonal neighbours sit in one run of consecutive open ring cells.
pub fn is_simple_point(grid: &Grid, pos: Vec2) -> bool {
    let open: Vec<bool> = RING
        .iter()
        .map(|(dx, dy)| grid.is_open(pos.x + dx, pos.y + dy))
        .collect();
    let orthogonal = [1usize, 3, 5, 7];
    if orthogonal.iter().filter(|idx| open[**idx]).count() <= 1 {
        return true;
    }
    let Some(start) = open.iter().position(|value| !value) else {
        return true;
    };

    let mut run_of = [usize::MAX; 8];
    let mut run = 0;
    for step in 1..=8 {
        let idx = (start + step) % 8;
        if open[idx] {
            run_of[idx] = run;
        } else {
            run += 1;
        }
    }
    let mut runs = orthogonal
        .iter()
        .filter(|idx| open[**idx])
        .map(|idx| run_of[*idx]);
    let first = runs.next();
    runs.all(|id| Some(id) == first)
}

pub fn seal_corner_touches(
    grid: &mut Grid,
    protected: &Mask,
    ring: &Mask,
    rng: &mut Rng,
    max_passes: usize,
) -> CornerStats {
    let mut stats = CornerStats::default();
    for _ in 0..max_passes {
        stats.passes += 1;
        let mut changed = false;
        let mut unresolved = 0;
        for y in 0..grid.height() - 1 {
            for x in 0..grid.width() - 1 {
                let Some((mut pair, mut walls)) = diagonal_touch(grid, x, y) else {
                    continue;
                };
                if rng.chance(0.5) {
                    pair.swap(0, 1);
                }
                if rng.chance(0.5) {
                    walls.swap(0, 1);
                }

                let sealable = pair.into_iter().find(|pos| {
                    grid.at(*pos) == Cell::Floor
                        && !protected.get(pos.x, pos.y)
                        && is_simple_point(grid, *pos)
                });
                if let Some(pos) = sealable {
                    grid.set(pos.x, pos.y, Cell::Wall);
                    stats.sealed += 1;
                    changed = true;
                    continue;
                }

                let openable = walls
                    .into_iter()
                    .find(|pos| !ring.get(pos.x, pos.y) && !grid.is_border(pos.x, pos.y));
                if let Some(pos) = openable {
                    grid.set(pos.x, pos.y, Cell::Floor);
                    stats.opened += 1;
                    changed = true;
                    continue;
                }
                unresolved += 1;
            }
        }
        stats.unresolved = unresolved;
        if !changed {
            break;
        }
    }
    stats
}

pub fn open_corner_touches(grid: &mut Grid, ring: &Mask, max_passes: usize) -> CornerStats {
    let mut stats = CornerStats::default();
    for _ in 0..max_passes {
        stats.passes += 1;
        let mut changed = false;
        let mut unresolved = 0;
        for y in 0..grid.height() - 1 {
            for x in 0..grid.width() - 1 {
                let Some((_, walls)) = diagonal_touch(grid, x, y) else {
                    continue;
                };
                let openable = walls
                    .into_iter()
                    .find(|pos| !ring.get(pos.x, pos.y) && !grid.is_border(pos.x, pos.y));
                match openable {
                    Some(pos) => {
                        grid.set(pos.x, pos.y, Cell::Floor);
                        stats.opened += 1;
                        changed = true;
                    }
                    None => unresolved += 1,
                }
            }
        }
        stats.unresolved = unresolved;
        if !changed {
            break;
        }
    }
    stats
}
