use crate::constants::{MAX_CORRIDOR, MIN_CORRIDOR};
use crate::types::{Cell, Rect, Vec2};

use super::grid::{Grid, Mask};

pub fn clamp_corridor_width(width: i32) -> i32 {
    width.clamp(MIN_CORRIDOR, MAX_CORRIDOR)
}

pub fn prefers_horizontal(from: Vec2, to: Vec2) -> bool {
    (to.x - from.x).abs() >= (to.y - from.y).abs()
}

pub fn corridor_footprint(from: Vec2, to: Vec2, width: i32, horizontal_first: bool) -> [Rect; 2] {
    let extra = clamp_corridor_width(width) - 1;
    let (left, right) = (from.x.min(to.x), from.x.max(to.x) + extra);
    let (top, bottom) = (from.y.min(to.y), from.y.max(to.y) + extra);
    if horizontal_first {
        [
            Rect::from_corners(left, from.y, right, from.y + extra),
            Rect::from_corners(to.x, top, to.x + extra, bottom),
        ]
    } else {
        [
            Rect::from_corners(from.x, top, from.x + extra, bottom),
            Rect::from_corners(left, to.y, right, to.y + extra),
        ]
    }
}

pub fn carve_orthogonal_corridor(grid: &mut Grid, from: Vec2, to: Vec2, width: i32) -> usize {
    carve_oriented(grid, from, to, width, prefers_horizontal(from, to))
}

/// Only walls turn into floor: doors survive and repeated carves are no-ops.
/// The outer border row and column are never opened.
pub fn carve_oriented(
    grid: &mut Grid,
    from: Vec2,
    to: Vec2,
    width: i32,
    horizontal_first: bool,
) -> usize {
    let mut opened = 0;
    for leg in corridor_footprint(from, to, width, horizontal_first) {
        for pos in leg.cells() {
            if grid.is_border(pos.x, pos.y) || !grid.in_bounds(pos.x, pos.y) {
                continue;
            }
            if grid.at(pos) == Cell::Wall {
                grid.set(pos.x, pos.y, Cell::Floor);
                opened += 1;
            }
        }
    }
    opened
}

pub fn footprint_touches(footprint: &[Rect; 2], forbidden: &Rect) -> bool {
    footprint.iter().any(|leg| leg.intersects(forbidden))
}

pub fn thicken_corridors(grid: &mut Grid, blocked: &Mask) -> usize {
    let mut opened = 0;
    for y in 1..grid.height() - 1 {
        for x in 1..grid.width() - 1 {
            if grid.get(x, y) != Cell::Floor || blocked.get(x, y) {
                continue;
            }
            let horizontal_lane = grid.is_open(x - 1, y)
                && grid.is_open(x + 1, y)
                && !grid.is_open(x, y - 1)
                && !grid.is_open(x, y + 1);
            let vertical_lane = grid.is_open(x, y - 1)
                && grid.is_open(x, y + 1)
                && !grid.is_open(x - 1, y)
                && !grid.is_open(x + 1, y);
            let candidates = if horizontal_lane {
                [(x, y + 1), (x, y - 1)]
            } else if vertical_lane {
                [(x + 1, y), (x - 1, y)]
            } else {
                continue;
            };
            for (cx, cy) in candidates {
                if grid.is_border(cx, cy) || blocked.get(cx, cy) {
                    continue;
                }
                grid.set(cx, cy, Cell::Floor);
                opened += 1;
                break;
            }
        }
    }
    opened
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_run(grid: &Grid, x: i32, y: i32, dx: i32, dy: i32) -> i32 {
        let mut len = 0;
        let (mut cx, mut cy) = (x, y);
        while grid.is_open(cx, cy) {
            len += 1;
            cx += dx;
            cy += dy;
        }
        let (mut cx, mut cy) = (x - dx, y - dy);
        while grid.is_open(cx, cy) {
            len += 1;
            cx -= dx;
            cy -= dy;
        }
        len
    }

    #[test]
    fn width_is_clamped_into_bounds() {
        assert_eq!(clamp_corridor_width(0), 2);
        assert_eq!(clamp_corridor_width(2), 2);
        assert_eq!(clamp_corridor_width(3), 3);
        assert_eq!(clamp_corridor_width(9), 3);
    }

    #[test]
    fn straight_corridor_has_requested_width() {
        for width in [1, 2, 3, 4] {
            let mut grid = Grid::new(40, 20);
            carve_orthogonal_corridor(&mut grid, Vec2::new(5, 8), Vec2::new(30, 8), width);
            let expected = clamp_corridor_width(width);
            for x in 5..=30 {
                assert_eq!(open_run(&grid, x, 8, 0, 1), expected, "x={x} width={width}");
            }
        }
    }

    #[test]
    fn l_corridor_connects_both_anchors() {
        let mut grid = Grid::new(50, 50);
        let from = Vec2::new(5, 40);
        let to = Vec2::new(40, 6);
        carve_orthogonal_corridor(&mut grid, from, to, 2);
        assert!(grid.is_open(from.x, from.y));
        assert!(grid.is_open(to.x, to.y));
        // horizontal leg first because |dx| >= |dy|
        assert!(grid.is_open(40, 40));
        assert!(!grid.is_open(5, 6));
        for y in 6..40 {
            assert_eq!(open_run(&grid, 40, y, 1, 0), 2, "y={y}");
        }
    }

    #[test]
    fn vertical_first_when_y_span_dominates() {
        let mut grid = Grid::new(40, 60);
        carve_orthogonal_corridor(&mut grid, Vec2::new(5, 5), Vec2::new(20, 50), 3);
        assert!(grid.is_open(5, 50));
        assert!(!grid.is_open(20, 5));
    }

    #[test]
    fn carving_twice_is_a_no_op_and_keeps_doors() {
        let mut grid = Grid::new(30, 30);
        grid.set(10, 5, Cell::Door);
        let first = carve_orthogonal_corridor(&mut grid, Vec2::new(3, 5), Vec2::new(25, 5), 2);
        let snapshot = grid.clone();
        let second = carve_orthogonal_corridor(&mut grid, Vec2::new(3, 5), Vec2::new(25, 5), 2);
        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(grid, snapshot);
        assert_eq!(grid.get(10, 5), Cell::Door);
    }

    #[test]
    fn border_is_never_carved() {
        let mut grid = Grid::new(20, 20);
        carve_orthogonal_corridor(&mut grid, Vec2::new(1, 17), Vec2::new(18, 17), 3);
        for x in 0..20 {
            assert_eq!(grid.get(x, 19), Cell::Wall);
        }
        for y in 0..20 {
            assert_eq!(grid.get(19, y), Cell::Wall);
        }
    }

    #[test]
    fn footprint_detects_forbidden_area() {
        let footprint = corridor_footprint(Vec2::new(2, 2), Vec2::new(20, 10), 2, true);
        assert!(footprint_touches(&footprint, &Rect::new(10, 2, 2, 2)));
        assert!(footprint_touches(&footprint, &Rect::new(20, 6, 1, 1)));
        assert!(!footprint_touches(&footprint, &Rect::new(2, 8, 3, 3)));
    }

    #[test]
    fn thickening_widens_single_lanes() {
        let mut grid = Grid::new(20, 10);
        for x in 2..18 {
            grid.set(x, 4, Cell::Floor);
        }
        let blocked = Mask::new(20, 10);
        let opened = thicken_corridors(&mut grid, &blocked);
        assert!(opened > 0);
        for x in 3..17 {
            assert_eq!(open_run(&grid, x, 4, 0, 1), 2, "x={x}");
        }
    }
}
