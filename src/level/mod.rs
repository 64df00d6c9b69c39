use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::constants::{
    get_level_side, BOSS_BAND, EXTRA_LINK_DIVISOR, MAX_CORRIDOR, MAX_LEVEL, MAX_LEVEL_SIDE,
    MIN_CORRIDOR, MIN_LEVEL, MIN_LEVEL_SIDE,
};
use crate::error::GenerateError;
use crate::placement_sink::{dispatch_placements, PlacementSink};
use crate::rng::Rng;
use crate::types::{
    Cell, ElevatorPair, GenerationReport, Placement, Rect, Room, RoomKind, RoomView, Vec2,
};

pub mod connectivity;
pub mod corners;
pub mod corridors;
pub mod doors;
pub mod grid;
pub mod render;
pub mod rooms;
mod repair_system;
pub mod spawn_system;
mod utils;

use self::connectivity::{flood, Passage};
use self::corridors::{carve_oriented, corridor_footprint, footprint_touches, prefers_horizontal};
use self::doors::collect_doors;
use self::grid::Grid;
use self::render::render_ascii;
use self::rooms::place_rooms;
use self::spawn_system::spawn_entities;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    pub seed: Option<u32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub charset: Option<Charset>,
    pub place: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GeneratedLevel {
    pub level: u32,
    pub width: i32,
    pub height: i32,
    pub seed: u32,
    pub grid: Grid,
    pub ascii: Vec<String>,
    pub placements: Vec<Placement>,
    pub rooms: Vec<RoomView>,
    pub elevators: Vec<ElevatorPair>,
    pub report: GenerationReport,
}

struct ResolvedOptions {
    width: i32,
    height: i32,
    seed: u32,
    charset: Charset,
}

fn check_dimension(axis: &'static str, value: i32) -> Result<i32, GenerateError> {
    if !(MIN_LEVEL_SIDE..=MAX_LEVEL_SIDE).contains(&value) {
        return Err(GenerateError::InvalidDimension {
            axis,
            value,
            min: MIN_LEVEL_SIDE,
            max: MAX_LEVEL_SIDE,
        });
    }
    Ok(value)
}

fn resolve_options(
    level: u32,
    options: &GenerateOptions,
) -> Result<ResolvedOptions, GenerateError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(GenerateError::InvalidLevel {
            level,
            min: MIN_LEVEL,
            max: MAX_LEVEL,
        });
    }
    let side = get_level_side(level);
    let width = check_dimension("width", options.width.unwrap_or(side))?;
    let height = check_dimension("height", options.height.unwrap_or(side))?;
    let charset = options.charset.clone().unwrap_or_default();
    charset.validate()?;
    Ok(ResolvedOptions {
        width,
        height,
        seed: options.seed.unwrap_or_else(rand::random::<u32>),
        charset,
    })
}

pub(crate) struct LevelBuilder {
    level: u32,
    grid: Grid,
    rooms: Vec<Room>,
    control: usize,
    boss: usize,
    rng: Rng,
    report: GenerationReport,
}

impl LevelBuilder {
    fn new(level: u32, width: i32, height: i32, seed: u32) -> Self {
        Self {
            level,
            grid: Grid::new(width, height),
            rooms: Vec::new(),
            control: 0,
            boss: 0,
            rng: Rng::new(seed),
            report: GenerationReport::new(seed, level, width, height),
        }
    }

    fn width(&self) -> i32 {
        self.grid.width()
    }

    fn height(&self) -> i32 {
        self.grid.height()
    }

    fn control_start(&self) -> Vec2 {
        self.rooms[self.control].center()
    }

    fn boss_zone(&self) -> Rect {
        self.rooms[self.boss].rect.expanded(1 + BOSS_BAND)
    }

    fn carve_rooms(&mut self) {
        let layout = place_rooms(self.level, self.width(), self.height(), &mut self.rng);
        self.report.room_target = layout.target;
        self.report.room_count = layout.rooms.len();
        if layout.used_fallback {
            self.report.warn("room placement fell back to two corner rooms".to_string());
        } else if layout.rooms.len() < layout.target {
            self.report.warn(format!("placed {} of {} rooms", layout.rooms.len(), layout.target));
        }
        for room in &layout.rooms {
            self.grid.fill(&room.rect, Cell::Floor);
        }
        self.rooms = layout.rooms;
        self.control = layout.control;
        self.boss = layout.boss;
    }

    fn corridor_width(&mut self) -> i32 {
        self.rng.int(MIN_CORRIDOR, MAX_CORRIDOR)
    }

    fn record_link(&mut self, a: usize, b: usize) {
        if !self.rooms[a].links.contains(&b) {
            self.rooms[a].links.push(b);
        }
        if !self.rooms[b].links.contains(&a) {
            self.rooms[b].links.push(a);
        }
        self.report.corridor_count += 1;
    }

    fn link_rooms(&mut self, a: usize, b: usize) -> bool {
        let from = self.rooms[a].center();
        let to = self.rooms[b].center();
        let width = self.corridor_width();
        let zone = self.boss_zone();
        let preferred = prefers_horizontal(from, to);
        for horizontal_first in [preferred, !preferred] {
            let footprint = corridor_footprint(from, to, width, horizontal_first);
            if footprint_touches(&footprint, &zone) {
                continue;
            }
            carve_oriented(&mut self.grid, from, to, width, horizontal_first);
            self.record_link(a, b);
            return true;
        }
        self.report.skipped_links += 1;
        false
    }

    fn connect_rooms(&mut self) {
        let ordinary: Vec<usize> = self
            .rooms
            .iter()
            .filter(|room| room.kind != RoomKind::Boss)
            .map(|room| room.id)
            .collect();

        let mut connected: Vec<usize> = vec![self.control];
        let mut remaining: Vec<usize> = ordinary
            .iter()
            .copied()
            .filter(|id| *id != self.control)
            .collect();
        while !remaining.is_empty() {
            let mut best: Option<(i64, usize, usize)> = None;
            for &b in &remaining {
                for &a in &connected {
                    let dist = self.rooms[a].center().dist2(self.rooms[b].center());
                    if best.map(|current| (dist, b, a) < current).unwrap_or(true) {
                        best = Some((dist, b, a));
                    }
                }
            }
            let Some((_, b, a)) = best else {
                break;
            };
            self.link_rooms(a, b);
            connected.push(b);
            remaining.retain(|id| *id != b);
        }

        let extra = self.rooms.len() / EXTRA_LINK_DIVISOR;
        for _ in 0..extra {
            if ordinary.len() < 3 {
                break;
            }
            let a = ordinary[self.rng.pick_index(ordinary.len())];
            let center = self.rooms[a].center();
            let partner = ordinary
                .iter()
                .copied()
                .filter(|id| *id != a && !self.rooms[a].links.contains(id))
                .min_by_key(|id| (self.rooms[*id].center().dist2(center), *id));
            if let Some(b) = partner {
                self.link_rooms(a, b);
            }
        }

        let boss_center = self.rooms[self.boss].center();
        let nearest = ordinary
            .iter()
            .copied()
            .min_by_key(|id| (self.rooms[*id].center().dist2(boss_center), *id));
        if let Some(anchor) = nearest {
            let from = self.rooms[anchor].center();
            let width = self.corridor_width();
            carve_oriented(
                &mut self.grid,
                from,
                boss_center,
                width,
                prefers_horizontal(from, boss_center),
            );
            let boss = self.boss;
            self.record_link(anchor, boss);
        }
    }

    fn spawn(&mut self) -> spawn_system::SpawnResult {
        let doors = collect_doors(&self.grid, &self.rooms);
        let result = spawn_entities(&self.grid, &self.rooms, &doors, self.level, &mut self.rng);
        for warning in &result.warnings {
            self.report.warn(warning.clone());
        }
        result
    }

    fn room_views(&self) -> Vec<RoomView> {
        let doors = collect_doors(&self.grid, &self.rooms);
        self.rooms
            .iter()
            .map(|room| RoomView {
                id: room.id,
                kind: room.kind,
                x: room.rect.x,
                y: room.rect.y,
                w: room.rect.w,
                h: room.rect.h,
                center: room.center(),
                doors: doors
                    .iter()
                    .filter(|door| door.room == room.id)
                    .map(|door| door.tile)
                    .collect(),
                links: room.links.clone(),
            })
            .collect()
    }
}

/// Builds one level. Invalid options are rejected before any grid is
/// allocated; every later shortfall is recorded in the report instead.
pub fn generate(level: u32, options: &GenerateOptions) -> Result<GeneratedLevel, GenerateError> {
    let started = Instant::now();
    let resolved = resolve_options(level, options)?;
    let mut builder = LevelBuilder::new(level, resolved.width, resolved.height, resolved.seed);

    builder.carve_rooms();
    builder.connect_rooms();
    builder.repair_connectivity();
    builder.finalize();
    let spawned = builder.spawn();

    let ascii = render_ascii(&builder.grid, &spawned.placements, &resolved.charset);
    let rooms = builder.room_views();

    let start = builder.control_start();
    let grid = &builder.grid;
    let report = &mut builder.report;
    report.reachable_cells = flood(grid, start, Passage::BossLocked).count();
    report.door_count = grid.count(Cell::Door);
    report.boss_door_count = grid.count(Cell::BossDoor);
    report.floor_cells = grid.count(Cell::Floor);
    report.placement_count = spawned.placements.len();
    report.elevator_pairs = spawned.elevators.len();
    report.lights = spawned.lights;
    report.broken_lights = spawned.broken_lights;
    report.elapsed_ms = started.elapsed().as_millis() as u64;
    report.generated_at_iso = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    Ok(GeneratedLevel {
        level,
        width: resolved.width,
        height: resolved.height,
        seed: resolved.seed,
        grid: builder.grid,
        ascii,
        placements: spawned.placements,
        rooms,
        elevators: spawned.elevators,
        report: builder.report,
    })
}

pub fn generate_and_place<S: PlacementSink + ?Sized>(
    level: u32,
    options: &GenerateOptions,
    sink: &mut S,
) -> Result<GeneratedLevel, GenerateError> {
    let generated = generate(level, options)?;
    if options.place {
        dispatch_placements(&generated.placements, sink);
    }
    Ok(generated)
}

pub fn doors_per_side(grid: &Grid, room: &RoomView) -> [usize; 4] {
    let rect = Rect::new(room.x, room.y, room.w, room.h);
    let mut counts = [0usize; 4];
    for (idx, side) in crate::types::Side::ALL.into_iter().enumerate() {
        counts[idx] = side
            .ring_cells(&rect)
            .into_iter()
            .filter(|cell| grid.at(*cell).is_door())
            .count();
    }
    counts
}
