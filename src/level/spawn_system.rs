use std::collections::HashSet;

use crate::constants::{
    get_elevator_pairs, get_enemies_per_room, BROKEN_LIGHT_CHANCE, ELEVATOR_PAIR_RADIUS,
    FREE_TILE_ATTEMPTS, PATIENT_TRIPLES, TRIPLE_RADIUS,
};
use crate::rng::Rng;
use crate::types::{
    Cell, ElevatorPair, Placement, PlacementKind, PlacementOptions, Rect, Room, RoomKind,
    SpawnerKind, Vec2,
};

use super::doors::DoorInfo;
use super::grid::Grid;
use super::utils::manhattan;

#[derive(Clone, Debug, Default)]
pub struct SpawnResult {
    pub placements: Vec<Placement>,
    pub elevators: Vec<ElevatorPair>,
    pub lights: usize,
    pub broken_lights: usize,
    pub warnings: Vec<String>,
}

struct Spawner<'a> {
    grid: &'a Grid,
    rng: &'a mut Rng,
    occupied: HashSet<Vec2>,
    necks: HashSet<Vec2>,
    result: SpawnResult,
}

impl<'a> Spawner<'a> {
    fn new(grid: &'a Grid, doors: &[DoorInfo], rng: &'a mut Rng) -> Self {
        Self {
            grid,
            rng,
            occupied: HashSet::new(),
            necks: doors.iter().map(DoorInfo::interior).collect(),
            result: SpawnResult::default(),
        }
    }

    fn is_free(&self, pos: Vec2) -> bool {
        self.grid.at(pos) == Cell::Floor
            && !self.occupied.contains(&pos)
            && !self.necks.contains(&pos)
    }

    fn push(&mut self, kind: PlacementKind, tile: Vec2, options: PlacementOptions) {
        self.occupied.insert(tile);
        self.result.placements.push(Placement {
            kind,
            tile_x: tile.x,
            tile_y: tile.y,
            options,
        });
    }

    fn try_free_tile_in(&mut self, rect: &Rect) -> Option<Vec2> {
        for _ in 0..FREE_TILE_ATTEMPTS {
            let pos = Vec2::new(
                self.rng.int(rect.x, rect.right()),
                self.rng.int(rect.y, rect.bottom()),
            );
            if self.is_free(pos) {
                return Some(pos);
            }
        }
        rect.cells().find(|pos| self.is_free(*pos))
    }

    fn free_tile_in(&mut self, rect: &Rect) -> Vec2 {
        self.try_free_tile_in(rect).unwrap_or_else(|| rect.center())
    }

    fn try_free_tile_near(&mut self, rect: &Rect, anchor: Vec2, radius: i32) -> Option<Vec2> {
        let area = Rect::from_corners(
            (anchor.x - radius).max(rect.x),
            (anchor.y - radius).max(rect.y),
            (anchor.x + radius).min(rect.right()),
            (anchor.y + radius).min(rect.bottom()),
        );
        for _ in 0..FREE_TILE_ATTEMPTS {
            let pos = Vec2::new(
                self.rng.int(area.x, area.right()),
                self.rng.int(area.y, area.bottom()),
            );
            if manhattan(pos, anchor) <= radius && self.is_free(pos) {
                return Some(pos);
            }
        }
        let closest = area
            .cells()
            .filter(|pos| manhattan(*pos, anchor) <= radius && self.is_free(*pos))
            .min_by_key(|pos| (manhattan(*pos, anchor), pos.y, pos.x));
        closest
    }

    fn free_tile_around(&mut self, rect: &Rect, anchor: Vec2, radius: i32) -> Vec2 {
        let reach = rect.w + rect.h;
        let mut current = radius.max(1);
        while current <= reach {
            if let Some(pos) = self.try_free_tile_near(rect, anchor, current) {
                return pos;
            }
            current += radius.max(1);
        }
        self.free_tile_in(rect)
    }
}

fn spawner_options(room: usize, spawner: SpawnerKind) -> PlacementOptions {
    PlacementOptions {
        room: Some(room),
        spawner: Some(spawner),
        ..PlacementOptions::default()
    }
}

fn room_options(room: usize) -> PlacementOptions {
    PlacementOptions {
        room: Some(room),
        ..PlacementOptions::default()
    }
}

pub fn spawn_entities(
    grid: &Grid,
    rooms: &[Room],
    doors: &[DoorInfo],
    level: u32,
    rng: &mut Rng,
) -> SpawnResult {
    let mut spawner = Spawner::new(grid, doors, rng);
    let control = rooms.iter().find(|room| room.kind == RoomKind::Control);
    let boss = rooms.iter().find(|room| room.kind == RoomKind::Boss);
    let normals: Vec<&Room> = rooms
        .iter()
        .filter(|room| room.kind == RoomKind::Normal)
        .collect();

    if let Some(room) = control {
        spawner.push(PlacementKind::Player, room.center(), room_options(room.id));
        let phone = spawner.free_tile_in(&room.rect);
        spawner.push(PlacementKind::Phone, phone, room_options(room.id));
    }
    if let Some(room) = boss {
        spawner.push(PlacementKind::Boss, room.center(), room_options(room.id));
    }

    for door in doors {
        let options = PlacementOptions {
            room: Some(door.room),
            locked: Some(door.boss),
            boss: Some(door.boss),
            ..PlacementOptions::default()
        };
        spawner.push(PlacementKind::Door, door.tile, options);
    }

    for room in &normals {
        for _ in 0..get_enemies_per_room(level) {
            let kind = if spawner.rng.chance(0.5) {
                SpawnerKind::Mosquito
            } else {
                SpawnerKind::Rat
            };
            let tile = spawner.free_tile_in(&room.rect);
            spawner.push(PlacementKind::Spawner, tile, spawner_options(room.id, kind));
        }
        for kind in [SpawnerKind::Nurse, SpawnerKind::Celador, SpawnerKind::Cart] {
            let tile = spawner.free_tile_in(&room.rect);
            spawner.push(PlacementKind::Spawner, tile, spawner_options(room.id, kind));
        }
    }

    for room in rooms {
        let broken = spawner.rng.chance(BROKEN_LIGHT_CHANCE);
        let tile = spawner.free_tile_in(&room.rect);
        let options = PlacementOptions {
            room: Some(room.id),
            broken: Some(broken),
            ..PlacementOptions::default()
        };
        spawner.push(PlacementKind::Light, tile, options);
        spawner.result.lights += 1;
        if broken {
            spawner.result.broken_lights += 1;
        }
    }

    let elevator_rooms: Vec<&Room> = if normals.is_empty() {
        control.into_iter().collect()
    } else {
        normals.clone()
    };
    for pair_id in 0..get_elevator_pairs(level) {
        if elevator_rooms.is_empty() {
            break;
        }
        let room = elevator_rooms[spawner.rng.pick_index(elevator_rooms.len())];
        let Some(active) = spawner.try_free_tile_in(&room.rect) else {
            spawner
                .result
                .warnings
                .push(format!("elevator pair {pair_id} skipped: room {} is full", room.id));
            continue;
        };
        spawner.occupied.insert(active);
        let Some(closed) = spawner.try_free_tile_near(&room.rect, active, ELEVATOR_PAIR_RADIUS)
        else {
            spawner.occupied.remove(&active);
            spawner.result.warnings.push(format!(
                "elevator pair {pair_id} skipped: no closed endpoint near {},{}",
                active.x, active.y
            ));
            continue;
        };
        for (tile, is_active) in [(active, true), (closed, false)] {
            let options = PlacementOptions {
                room: Some(room.id),
                active: Some(is_active),
                pair_id: Some(pair_id),
                ..PlacementOptions::default()
            };
            spawner.push(PlacementKind::Elevator, tile, options);
        }
        spawner.result.elevators.push(ElevatorPair {
            id: pair_id,
            room: room.id,
            active,
            closed,
        });
    }

    let triple_rooms: Vec<&Room> = if normals.is_empty() {
        control.into_iter().collect()
    } else {
        normals
    };
    if !triple_rooms.is_empty() {
        for triple_id in 0..PATIENT_TRIPLES {
            let room = triple_rooms[triple_id % triple_rooms.len()];
            let options = PlacementOptions {
                room: Some(room.id),
                triple_id: Some(triple_id),
                ..PlacementOptions::default()
            };
            let patient = spawner.free_tile_in(&room.rect);
            spawner.push(PlacementKind::Patient, patient, options.clone());
            let pill = spawner.free_tile_around(&room.rect, patient, TRIPLE_RADIUS);
            spawner.push(PlacementKind::Pill, pill, options.clone());
            let bell = spawner.free_tile_around(&room.rect, patient, TRIPLE_RADIUS);
            spawner.push(PlacementKind::Bell, bell, options);
        }
    }

    spawner.result
}
