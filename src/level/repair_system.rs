use super::*;

use crate::constants::{
    FINALIZE_ROUNDS, MAX_CORNER_PASSES, MAX_REPAIR_ITERATIONS, REPAIR_TARGET_CANDIDATES,
};

use super::connectivity::{flood, nearest_visited_floor, Passage, Reachability};
use super::corners::{count_diagonal_touches, open_corner_touches, seal_corner_touches};
use super::corridors::{carve_orthogonal_corridor, thicken_corridors};
use super::doors::{normalize_room, reconnect_room, seal_doors, Reconnect};
use super::grid::Mask;
use super::utils::{interior_mask, ring_mask, side_facing};

struct Verification {
    reach: Reachability,
    unreached: Vec<usize>,
    boss_ok: bool,
}

impl LevelBuilder {
    fn carve_repair(&mut self, from: Vec2, reach: &Reachability, avoid_boss: bool) -> bool {
        let zone = self.boss_zone();
        let excluded: Vec<Rect> = if avoid_boss { vec![zone] } else { Vec::new() };
        let candidates = nearest_visited_floor(
            &self.grid,
            reach,
            from,
            &excluded,
            REPAIR_TARGET_CANDIDATES,
        );
        let width = self.corridor_width();

        if avoid_boss {
            for target in &candidates {
                let preferred = prefers_horizontal(from, *target);
                for horizontal_first in [preferred, !preferred] {
                    let footprint = corridor_footprint(from, *target, width, horizontal_first);
                    if footprint_touches(&footprint, &zone) {
                        continue;
                    }
                    carve_oriented(&mut self.grid, from, *target, width, horizontal_first);
                    self.report.repair_carves += 1;
                    return true;
                }
            }
        }

        let fallback = match candidates.first() {
            Some(target) => Some(*target),
            None => nearest_visited_floor(&self.grid, reach, from, &[], 1)
                .first()
                .copied(),
        };
        let Some(target) = fallback else {
            return false;
        };
        carve_orthogonal_corridor(&mut self.grid, from, target, width);
        self.report.repair_carves += 1;
        true
    }

    pub(super) fn repair_connectivity(&mut self) {
        let mut iterations = 0;
        let mut missing: Option<usize> = None;
        while iterations < MAX_REPAIR_ITERATIONS {
            let reach = flood(&self.grid, self.control_start(), Passage::AllOpen);
            missing = self
                .rooms
                .iter()
                .find(|room| !reach.touches(&room.rect))
                .map(|room| room.id);
            let Some(room_id) = missing else {
                break;
            };
            iterations += 1;
            let from = self.rooms[room_id].center();
            let avoid_boss = self.rooms[room_id].kind != RoomKind::Boss;
            if !self.carve_repair(from, &reach, avoid_boss) {
                break;
            }
        }
        self.report.repair_iterations = iterations;
        if iterations == MAX_REPAIR_ITERATIONS {
            let reach = flood(&self.grid, self.control_start(), Passage::AllOpen);
            missing = self
                .rooms
                .iter()
                .find(|room| !reach.touches(&room.rect))
                .map(|room| room.id);
        }
        if let Some(room_id) = missing {
            self.report.warn(format!(
                "repair stopped after {iterations} iterations with room {room_id} unreachable"
            ));
        }
    }

    fn normalize_all(&mut self) {
        for idx in 0..self.rooms.len() {
            let stats = normalize_room(&mut self.grid, &self.rooms[idx]);
            self.report.sealed_runs += stats.sealed_runs;
            self.report.vestibules += stats.vestibules;
        }
    }

    fn room_footprint_mask(&self) -> Mask {
        let mut mask = Mask::new(self.width(), self.height());
        for room in &self.rooms {
            mask.mark_rect(&room.rect.expanded(1));
        }
        mask
    }

    fn seal_corners(&mut self) {
        let (width, height) = (self.width(), self.height());
        let mut protected = interior_mask(&self.rooms, width, height);
        for door in collect_doors(&self.grid, &self.rooms) {
            let inside = door.interior();
            let outside = door.exterior();
            protected.set(inside.x, inside.y);
            protected.set(outside.x, outside.y);
        }
        let start = self.control_start();
        protected.set(start.x, start.y);
        let ring = ring_mask(&self.rooms, width, height);
        let stats = seal_corner_touches(
            &mut self.grid,
            &protected,
            &ring,
            &mut self.rng,
            MAX_CORNER_PASSES,
        );
        self.report.corner_seals += stats.sealed;
        self.report.corner_openings += stats.opened;
    }

    fn verify(&self) -> Verification {
        let reach = flood(&self.grid, self.control_start(), Passage::BossLocked);
        let unreached = self
            .rooms
            .iter()
            .filter(|room| room.kind != RoomKind::Boss && !reach.touches(&room.rect))
            .map(|room| room.id)
            .collect();
        let boss_doors = collect_doors(&self.grid, std::slice::from_ref(&self.rooms[self.boss]));
        let boss_ok = boss_doors.len() == 1
            && boss_doors[0].boss
            && self.grid.count(Cell::BossDoor) == 1
            && reach.contains(boss_doors[0].exterior());
        Verification {
            reach,
            unreached,
            boss_ok,
        }
    }

    fn reconnect(&mut self, check: &Verification) {
        for &room_id in &check.unreached {
            let room = self.rooms[room_id].clone();
            match reconnect_room(&mut self.grid, &room, &check.reach) {
                Reconnect::Punched => self.report.punched_doors += 1,
                Reconnect::Bridged => self.report.vestibules += 1,
                Reconnect::Unreachable => {
                    self.carve_repair(room.center(), &check.reach, true);
                }
            }
        }
        if !check.boss_ok {
            let boss = self.rooms[self.boss].clone();
            seal_doors(&mut self.grid, &boss);
            match reconnect_room(&mut self.grid, &boss, &check.reach) {
                Reconnect::Punched => self.report.punched_doors += 1,
                Reconnect::Bridged | Reconnect::Unreachable => {
                    self.carve_repair(boss.center(), &check.reach, false);
                }
            }
        }
    }

    pub(super) fn finalize(&mut self) {
        let blocked = self.room_footprint_mask();
        let mut settled = false;
        for round in 0..FINALIZE_ROUNDS {
            self.report.finalize_rounds = round + 1;
            self.normalize_all();
            self.report.thickened_cells += thicken_corridors(&mut self.grid, &blocked);
            self.seal_corners();
            let check = self.verify();
            if check.unreached.is_empty() && check.boss_ok {
                settled = true;
                break;
            }
            self.reconnect(&check);
        }

        if !settled {
            self.normalize_all();
            self.seal_corners();
            let check = self.verify();
            if !check.unreached.is_empty() {
                self.report.warn(format!(
                    "finalize stopped after {FINALIZE_ROUNDS} rounds with rooms {:?} unreachable",
                    check.unreached
                ));
            }
        }

        self.ensure_boss_door();
        self.clear_corner_touches();
    }

    fn ensure_boss_door(&mut self) {
        if self.verify().boss_ok {
            return;
        }
        let boss = self.rooms[self.boss].clone();
        seal_doors(&mut self.grid, &boss);
        let side = side_facing(&boss, self.control_start());
        let cells = side.ring_cells(&boss.rect);
        let door = cells[(cells.len() - 1) / 2];
        let (dx, dy) = side.outward();
        self.grid.set(door.x, door.y, Cell::BossDoor);
        for step in 1..=2 {
            let pos = door.offset(dx * step, dy * step);
            if !self.grid.is_border(pos.x, pos.y) && self.grid.at(pos) == Cell::Wall {
                self.grid.set(pos.x, pos.y, Cell::Floor);
            }
        }

        let reach = flood(&self.grid, self.control_start(), Passage::BossLocked);
        if !reach.contains(door.offset(dx, dy)) {
            let stub = door.offset(dx * 2, dy * 2);
            if let Some(target) = nearest_visited_floor(&self.grid, &reach, stub, &[], 1).first() {
                let width = self.corridor_width();
                carve_orthogonal_corridor(&mut self.grid, stub, *target, width);
                self.report.repair_carves += 1;
            }
            self.normalize_all();
        }
        self.seal_corners();

        if !self.verify().boss_ok {
            self.report.warn("boss door was forced but stays unreachable".to_string());
        }
    }

    fn clear_corner_touches(&mut self) {
        if count_diagonal_touches(&self.grid) == 0 {
            return;
        }
        let ring = ring_mask(&self.rooms, self.width(), self.height());
        let passes = (self.width() + self.height()) as usize;
        let stats = open_corner_touches(&mut self.grid, &ring, passes);
        self.report.corner_openings += stats.opened;
        if stats.unresolved > 0 {
            self.report.warn(format!(
                "{} diagonal touches could not be resolved",
                stats.unresolved
            ));
        }
    }
}
