use crate::types::{Cell, Rect, Room, RoomKind, Side, Vec2};

use super::connectivity::Reachability;
use super::grid::Grid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub sealed_runs: usize,
    pub vestibules: usize,
}

impl NormalizeStats {
    fn absorb(&mut self, other: NormalizeStats) {
        self.sealed_runs += other.sealed_runs;
        self.vestibules += other.vestibules;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorInfo {
    pub room: usize,
    pub side: Side,
    pub tile: Vec2,
    pub boss: bool,
}

impl DoorInfo {
    pub fn interior(&self) -> Vec2 {
        let (dx, dy) = self.side.outward();
        self.tile.offset(-dx, -dy)
    }

    pub fn exterior(&self) -> Vec2 {
        let (dx, dy) = self.side.outward();
        self.tile.offset(dx, dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconnect {
    Punched,
    Bridged,
    Unreachable,
}

fn door_cell(kind: RoomKind) -> Cell {
    match kind {
        RoomKind::Boss => Cell::BossDoor,
        RoomKind::Normal | RoomKind::Control => Cell::Door,
    }
}

/// A ring cell opens onto a real corridor when the two tiles beyond it are
/// open. An existing door only needs its exterior tile.
fn leads(grid: &Grid, cell: Vec2, side: Side) -> bool {
    let (dx, dy) = side.outward();
    let out1 = grid.at(cell.offset(dx, dy)).is_open();
    if grid.at(cell).is_door() {
        return out1;
    }
    out1 && grid.at(cell.offset(dx * 2, dy * 2)).is_open()
}

fn open_runs(grid: &Grid, cells: &[Vec2]) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for (idx, cell) in cells.iter().enumerate() {
        if grid.at(*cell).is_open() {
            current.push(idx);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Doubled distance to the side midpoint, so odd and even lengths compare
/// without rounding.
fn mid_distance(idx: usize, len: usize) -> usize {
    (2 * idx).abs_diff(len.saturating_sub(1))
}

fn seal(grid: &mut Grid, cells: &[Vec2], run: &[usize]) {
    for &idx in run {
        grid.set(cells[idx].x, cells[idx].y, Cell::Wall);
    }
}

fn carve_vestibule(grid: &mut Grid, cells: &[Vec2], side: Side, a: usize, b: usize) {
    let (dx, dy) = side.outward();
    for idx in a.min(b)..=a.max(b) {
        for step in 1..=2 {
            let pos = cells[idx].offset(dx * step, dy * step);
            if grid.is_border(pos.x, pos.y) {
                continue;
            }
            if grid.at(pos) == Cell::Wall {
                grid.set(pos.x, pos.y, Cell::Floor);
            }
        }
    }
}

fn corner_cells(rect: &Rect) -> [Vec2; 4] {
    [
        Vec2::new(rect.x - 1, rect.y - 1),
        Vec2::new(rect.right() + 1, rect.y - 1),
        Vec2::new(rect.x - 1, rect.bottom() + 1),
        Vec2::new(rect.right() + 1, rect.bottom() + 1),
    ]
}

pub fn normalize_room(grid: &mut Grid, room: &Room) -> NormalizeStats {
    for corner in corner_cells(&room.rect) {
        grid.set(corner.x, corner.y, Cell::Wall);
    }
    match room.kind {
        RoomKind::Boss => normalize_boss(grid, &room.rect),
        RoomKind::Normal | RoomKind::Control => {
            let mut stats = NormalizeStats::default();
            for side in Side::ALL {
                stats.absorb(normalize_side(grid, &room.rect, side));
            }
            stats
        }
    }
}

fn normalize_side(grid: &mut Grid, rect: &Rect, side: Side) -> NormalizeStats {
    let mut stats = NormalizeStats::default();
    let cells = side.ring_cells(rect);
    let runs = open_runs(grid, &cells);
    if runs.is_empty() {
        return stats;
    }

    let keeper = runs
        .iter()
        .enumerate()
        .flat_map(|(run_idx, run)| run.iter().map(move |&idx| (run_idx, idx)))
        .filter(|&(_, idx)| leads(grid, cells[idx], side))
        .min_by_key(|&(_, idx)| {
            let existing = if grid.at(cells[idx]).is_door() { 0 } else { 1 };
            (existing, mid_distance(idx, cells.len()), idx)
        });

    let Some((keeper_run, keeper_idx)) = keeper else {
        for run in &runs {
            seal(grid, &cells, run);
        }
        stats.sealed_runs += runs.len();
        return stats;
    };

    for (run_idx, run) in runs.iter().enumerate() {
        if run_idx == keeper_run {
            let others: Vec<usize> = run.iter().copied().filter(|idx| *idx != keeper_idx).collect();
            seal(grid, &cells, &others);
            continue;
        }
        if run.iter().any(|&idx| leads(grid, cells[idx], side)) {
            let far = if run[0] > keeper_idx {
                run[run.len() - 1]
            } else {
                run[0]
            };
            carve_vestibule(grid, &cells, side, keeper_idx, far);
            stats.vestibules += 1;
        }
        seal(grid, &cells, run);
        stats.sealed_runs += 1;
    }
    let keeper_cell = cells[keeper_idx];
    grid.set(keeper_cell.x, keeper_cell.y, Cell::Door);
    stats
}

fn normalize_boss(grid: &mut Grid, rect: &Rect) -> NormalizeStats {
    let mut stats = NormalizeStats::default();
    let mut best: Option<((usize, usize, usize, usize), Vec2)> = None;
    let mut all_runs: Vec<(Vec<Vec2>, Vec<Vec<usize>>)> = Vec::new();

    for (side_idx, side) in Side::ALL.into_iter().enumerate() {
        let cells = side.ring_cells(rect);
        let runs = open_runs(grid, &cells);
        for run in &runs {
            for &idx in run {
                if !leads(grid, cells[idx], side) {
                    continue;
                }
                let existing = if grid.at(cells[idx]).is_door() { 0 } else { 1 };
                let key = (existing, mid_distance(idx, cells.len()), side_idx, idx);
                if best.map(|(current, _)| key < current).unwrap_or(true) {
                    best = Some((key, cells[idx]));
                }
            }
        }
        all_runs.push((cells, runs));
    }

    let keeper = best.map(|(_, cell)| cell);
    for (cells, runs) in &all_runs {
        for run in runs {
            let holds_keeper = run.iter().any(|&idx| Some(cells[idx]) == keeper);
            seal(grid, cells, run);
            if !holds_keeper {
                stats.sealed_runs += 1;
            }
        }
    }
    if let Some(cell) = keeper {
        grid.set(cell.x, cell.y, Cell::BossDoor);
    }
    stats
}

pub fn collect_doors(grid: &Grid, rooms: &[Room]) -> Vec<DoorInfo> {
    let mut doors = Vec::new();
    for room in rooms {
        for side in Side::ALL {
            for cell in side.ring_cells(&room.rect) {
                let value = grid.at(cell);
                if value.is_door() {
                    doors.push(DoorInfo {
                        room: room.id,
                        side,
                        tile: cell,
                        boss: value == Cell::BossDoor,
                    });
                }
            }
        }
    }
    doors
}

pub fn seal_doors(grid: &mut Grid, room: &Room) -> usize {
    let mut sealed = 0;
    for side in Side::ALL {
        for cell in side.ring_cells(&room.rect) {
            if grid.at(cell).is_door() {
                grid.set(cell.x, cell.y, Cell::Wall);
                sealed += 1;
            }
        }
    }
    sealed
}

pub fn reconnect_room(grid: &mut Grid, room: &Room, reach: &Reachability) -> Reconnect {
    for side in Side::ALL {
        let cells = side.ring_cells(&room.rect);
        let (dx, dy) = side.outward();
        let door_idx = cells.iter().position(|cell| grid.at(*cell).is_door());
        let mut order: Vec<usize> = (0..cells.len()).collect();
        order.sort_by_key(|&idx| (mid_distance(idx, cells.len()), idx));

        for idx in order {
            let out1 = cells[idx].offset(dx, dy);
            if grid.at(out1) != Cell::Floor || !reach.contains(out1) {
                continue;
            }
            match door_idx {
                None => {
                    grid.set(cells[idx].x, cells[idx].y, door_cell(room.kind));
                    return Reconnect::Punched;
                }
                Some(door) => {
                    if room.kind == RoomKind::Boss {
                        break;
                    }
                    carve_vestibule(grid, &cells, side, door, idx);
                    return Reconnect::Bridged;
                }
            }
        }
    }
    Reconnect::Unreachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::connectivity::{flood, Passage};
    use crate::level::corridors::carve_orthogonal_corridor;

    fn room(id: usize, rect: Rect, kind: RoomKind) -> Room {
        let mut room = Room::new(id, rect);
        room.kind = kind;
        room
    }

    fn side_doors(grid: &Grid, rect: &Rect, side: Side) -> Vec<Vec2> {
        side.ring_cells(rect)
            .into_iter()
            .filter(|cell| grid.at(*cell).is_door())
            .collect()
    }

    #[test]
    fn perpendicular_corridor_becomes_single_door() {
        let mut grid = Grid::new(40, 30);
        let rect = Rect::new(5, 10, 10, 8);
        grid.fill(&rect, Cell::Floor);
        carve_orthogonal_corridor(&mut grid, rect.center(), Vec2::new(35, 14), 3);
        normalize_room(&mut grid, &room(0, rect, RoomKind::Normal));

        assert_eq!(grid.count(Cell::Door), 1);
        let doors = side_doors(&grid, &rect, Side::Right);
        assert_eq!(doors.len(), 1);
        let door = doors[0];
        assert_eq!(door.x, 15);
        assert!(grid.get(door.x - 1, door.y).is_open());
        assert!(grid.get(door.x + 1, door.y).is_open());
        for cell in Side::Right.ring_cells(&rect) {
            if cell != door {
                assert_eq!(grid.at(cell), Cell::Wall);
            }
        }
    }

    #[test]
    fn dead_pocket_is_sealed() {
        let mut grid = Grid::new(30, 30);
        let rect = Rect::new(5, 5, 8, 8);
        grid.fill(&rect, Cell::Floor);
        grid.set(13, 7, Cell::Floor);
        grid.set(14, 7, Cell::Floor);
        let stats = normalize_room(&mut grid, &room(0, rect, RoomKind::Normal));
        assert_eq!(grid.count(Cell::Door), 0);
        assert_eq!(stats.sealed_runs, 1);
        assert_eq!(grid.get(13, 7), Cell::Wall);
    }

    #[test]
    fn second_corridor_on_same_side_joins_through_vestibule() {
        let mut grid = Grid::new(50, 40);
        let rect = Rect::new(5, 10, 20, 10);
        grid.fill(&rect, Cell::Floor);
        carve_orthogonal_corridor(&mut grid, Vec2::new(8, 14), Vec2::new(8, 35), 2);
        carve_orthogonal_corridor(&mut grid, Vec2::new(20, 14), Vec2::new(20, 35), 2);
        let stats = normalize_room(&mut grid, &room(0, rect, RoomKind::Normal));

        assert_eq!(side_doors(&grid, &rect, Side::Bottom).len(), 1);
        assert_eq!(stats.vestibules, 1);
        let reach = flood(&grid, rect.center(), Passage::BossLocked);
        assert!(reach.is_visited(8, 30));
        assert!(reach.is_visited(20, 30));
    }

    #[test]
    fn boss_room_keeps_one_opening_overall() {
        let mut grid = Grid::new(60, 60);
        let rect = Rect::new(20, 20, 10, 10);
        grid.fill(&rect, Cell::Floor);
        carve_orthogonal_corridor(&mut grid, rect.center(), Vec2::new(55, 25), 2);
        carve_orthogonal_corridor(&mut grid, rect.center(), Vec2::new(25, 55), 2);
        carve_orthogonal_corridor(&mut grid, rect.center(), Vec2::new(3, 25), 2);
        normalize_room(&mut grid, &room(0, rect, RoomKind::Boss));

        let doors: usize = Side::ALL
            .into_iter()
            .map(|side| side_doors(&grid, &rect, side).len())
            .sum();
        assert_eq!(doors, 1);
        assert_eq!(grid.count(Cell::BossDoor), 1);
        assert_eq!(grid.count(Cell::Door), 0);
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let mut grid = Grid::new(40, 30);
        let rect = Rect::new(5, 10, 10, 8);
        grid.fill(&rect, Cell::Floor);
        carve_orthogonal_corridor(&mut grid, rect.center(), Vec2::new(35, 14), 2);
        let normal = room(0, rect, RoomKind::Normal);
        normalize_room(&mut grid, &normal);
        let snapshot = grid.clone();
        normalize_room(&mut grid, &normal);
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn reconnect_punches_door_towards_reachable_lane() {
        let mut grid = Grid::new(40, 30);
        let rect = Rect::new(10, 10, 8, 6);
        grid.fill(&rect, Cell::Floor);
        for x in 2..30 {
            grid.set(x, 8, Cell::Floor);
            grid.set(x, 7, Cell::Floor);
        }
        let reach = flood(&grid, Vec2::new(2, 8), Passage::BossLocked);
        let normal = room(0, rect, RoomKind::Normal);
        assert_eq!(reconnect_room(&mut grid, &normal, &reach), Reconnect::Punched);
        assert_eq!(side_doors(&grid, &rect, Side::Top).len(), 1);
        let after = flood(&grid, Vec2::new(2, 8), Passage::BossLocked);
        assert!(after.touches(&rect));
    }

    #[test]
    fn collect_doors_reports_boss_flag() {
        let mut grid = Grid::new(30, 30);
        let rect = Rect::new(5, 5, 6, 6);
        grid.set(11, 7, Cell::BossDoor);
        grid.set(7, 4, Cell::Door);
        let rooms = vec![room(3, rect, RoomKind::Boss)];
        let doors = collect_doors(&grid, &rooms);
        assert_eq!(doors.len(), 2);
        let boss = doors.iter().find(|door| door.boss).expect("boss door listed");
        assert_eq!(boss.side, Side::Right);
        assert_eq!(boss.exterior(), Vec2::new(12, 7));
        assert_eq!(boss.interior(), Vec2::new(10, 7));
    }
}
