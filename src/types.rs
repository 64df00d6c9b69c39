use serde::{Deserialize, Serialize};

use crate::constants::TILE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn dist2(self, other: Vec2) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

pub fn tile_to_world(tile: Vec2) -> WorldPos {
    WorldPos {
        x: (tile.x * TILE_SIZE) as f32 + TILE_SIZE as f32 / 2.0,
        y: (tile.y * TILE_SIZE) as f32 + TILE_SIZE as f32 / 2.0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Wall,
    Floor,
    Door,
    BossDoor,
}

impl Cell {
    pub fn is_open(self) -> bool {
        self != Cell::Wall
    }

    pub fn is_door(self) -> bool {
        matches!(self, Cell::Door | Cell::BossDoor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        Self::new(left, top, right - left + 1, bottom - top + 1)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h - 1
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x <= self.right() && y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    pub fn expanded(&self, margin: i32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2,
            self.h + margin * 2,
        )
    }

    pub fn ring_contains(&self, x: i32, y: i32) -> bool {
        self.expanded(1).contains(x, y) && !self.contains(x, y)
    }

    pub fn cells(&self) -> impl Iterator<Item = Vec2> + '_ {
        (self.y..=self.bottom())
            .flat_map(move |y| (self.x..=self.right()).map(move |x| Vec2::new(x, y)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Normal,
    Control,
    Boss,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub id: usize,
    pub rect: Rect,
    pub kind: RoomKind,
    pub links: Vec<usize>,
}

impl Room {
    pub fn new(id: usize, rect: Rect) -> Self {
        Self {
            id,
            rect,
            kind: RoomKind::Normal,
            links: Vec::new(),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn outward(self) -> (i32, i32) {
        match self {
            Side::Top => (0, -1),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
        }
    }

    pub fn ring_cells(self, rect: &Rect) -> Vec<Vec2> {
        match self {
            Side::Top => (rect.x..=rect.right()).map(|x| Vec2::new(x, rect.y - 1)).collect(),
            Side::Bottom => (rect.x..=rect.right())
                .map(|x| Vec2::new(x, rect.bottom() + 1))
                .collect(),
            Side::Left => (rect.y..=rect.bottom()).map(|y| Vec2::new(rect.x - 1, y)).collect(),
            Side::Right => (rect.y..=rect.bottom())
                .map(|y| Vec2::new(rect.right() + 1, y))
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    Player,
    Phone,
    Door,
    Boss,
    Light,
    Spawner,
    Elevator,
    Patient,
    Pill,
    Bell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnerKind {
    Mosquito,
    Rat,
    Nurse,
    Celador,
    Cart,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlacementOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawner: Option<SpawnerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boss: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(rename = "pairId", skip_serializing_if = "Option::is_none")]
    pub pair_id: Option<usize>,
    #[serde(rename = "tripleId", skip_serializing_if = "Option::is_none")]
    pub triple_id: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Placement {
    #[serde(rename = "type")]
    pub kind: PlacementKind,
    #[serde(rename = "tileX")]
    pub tile_x: i32,
    #[serde(rename = "tileY")]
    pub tile_y: i32,
    pub options: PlacementOptions,
}

impl Placement {
    pub fn tile(&self) -> Vec2 {
        Vec2::new(self.tile_x, self.tile_y)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RoomView {
    pub id: usize,
    pub kind: RoomKind,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub center: Vec2,
    pub doors: Vec<Vec2>,
    pub links: Vec<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ElevatorPair {
    pub id: usize,
    pub room: usize,
    pub active: Vec2,
    pub closed: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    Complete,
    Degraded,
}

#[derive(Clone, Debug, Serialize)]
pub struct GenerationReport {
    pub seed: u32,
    pub level: u32,
    pub width: i32,
    pub height: i32,
    pub outcome: GenerationOutcome,
    #[serde(rename = "roomTarget")]
    pub room_target: usize,
    #[serde(rename = "roomCount")]
    pub room_count: usize,
    #[serde(rename = "corridorCount")]
    pub corridor_count: usize,
    #[serde(rename = "skippedLinks")]
    pub skipped_links: usize,
    #[serde(rename = "repairCarves")]
    pub repair_carves: usize,
    #[serde(rename = "repairIterations")]
    pub repair_iterations: usize,
    #[serde(rename = "finalizeRounds")]
    pub finalize_rounds: usize,
    #[serde(rename = "sealedRuns")]
    pub sealed_runs: usize,
    pub vestibules: usize,
    #[serde(rename = "punchedDoors")]
    pub punched_doors: usize,
    #[serde(rename = "thickenedCells")]
    pub thickened_cells: usize,
    #[serde(rename = "cornerSeals")]
    pub corner_seals: usize,
    #[serde(rename = "cornerOpenings")]
    pub corner_openings: usize,
    #[serde(rename = "doorCount")]
    pub door_count: usize,
    #[serde(rename = "bossDoorCount")]
    pub boss_door_count: usize,
    #[serde(rename = "floorCells")]
    pub floor_cells: usize,
    #[serde(rename = "reachableCells")]
    pub reachable_cells: usize,
    #[serde(rename = "placementCount")]
    pub placement_count: usize,
    #[serde(rename = "elevatorPairs")]
    pub elevator_pairs: usize,
    pub lights: usize,
    #[serde(rename = "brokenLights")]
    pub broken_lights: usize,
    pub warnings: Vec<String>,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    #[serde(rename = "generatedAtIso")]
    pub generated_at_iso: String,
}

impl GenerationReport {
    pub fn new(seed: u32, level: u32, width: i32, height: i32) -> Self {
        Self {
            seed,
            level,
            width,
            height,
            outcome: GenerationOutcome::Complete,
            room_target: 0,
            room_count: 0,
            corridor_count: 0,
            skipped_links: 0,
            repair_carves: 0,
            repair_iterations: 0,
            finalize_rounds: 0,
            sealed_runs: 0,
            vestibules: 0,
            punched_doors: 0,
            thickened_cells: 0,
            corner_seals: 0,
            corner_openings: 0,
            door_count: 0,
            boss_door_count: 0,
            floor_cells: 0,
            reachable_cells: 0,
            placement_count: 0,
            elevator_pairs: 0,
            lights: 0,
            broken_lights: 0,
            warnings: Vec::new(),
            elapsed_ms: 0,
            generated_at_iso: String::new(),
        }
    }

    pub fn warn(&mut self, message: String) {
        self.outcome = GenerationOutcome::Degraded;
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_ring_excludes_interior() {
        let rect = Rect::new(10, 10, 4, 3);
        assert!(rect.ring_contains(9, 9));
        assert!(rect.ring_contains(14, 13));
        assert!(rect.ring_contains(12, 9));
        assert!(!rect.ring_contains(10, 10));
        assert!(!rect.ring_contains(15, 10));
        assert_eq!(rect.cells().count(), 12);
    }

    #[test]
    fn side_ring_cells_skip_corners() {
        let rect = Rect::new(10, 10, 4, 3);
        let top = Side::Top.ring_cells(&rect);
        assert_eq!(top.first(), Some(&Vec2::new(10, 9)));
        assert_eq!(top.last(), Some(&Vec2::new(13, 9)));
        let right = Side::Right.ring_cells(&rect);
        assert_eq!(right.len(), 3);
        assert!(right.iter().all(|cell| cell.x == 14));
    }

    #[test]
    fn from_corners_normalizes_order() {
        assert_eq!(Rect::from_corners(5, 9, 2, 3), Rect::new(2, 3, 4, 7));
    }

    #[test]
    fn tile_to_world_returns_tile_center() {
        let pos = tile_to_world(Vec2::new(2, 3));
        assert_eq!(pos.x, 80.0);
        assert_eq!(pos.y, 112.0);
    }

    #[test]
    fn placement_serializes_with_wire_names() {
        let placement = Placement {
            kind: PlacementKind::Spawner,
            tile_x: 4,
            tile_y: 5,
            options: PlacementOptions {
                spawner: Some(SpawnerKind::Rat),
                room: Some(2),
                ..PlacementOptions::default()
            },
        };
        let json = serde_json::to_value(&placement).expect("placement should serialize");
        assert_eq!(json["type"], "spawner");
        assert_eq!(json["tileX"], 4);
        assert_eq!(json["options"]["spawner"], "rat");
        assert!(json["options"].get("broken").is_none());
    }
}
