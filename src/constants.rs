pub const TILE_SIZE: i32 = 32;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 9;

pub const BASE_LEVEL_SIDE: i32 = 350;
pub const MIN_LEVEL_SIDE: i32 = 48;
pub const MAX_LEVEL_SIDE: i32 = 2_048;

pub const MAP_MARGIN: i32 = 5;
pub const MIN_ROOM_GAP: i32 = 4;
pub const ROOM_MIN_SIDE: i32 = 8;
pub const ROOM_AREA_PER_ROOM: i32 = 4_000;
pub const MIN_ROOM_TARGET: usize = 4;
pub const MAX_ROOM_TARGET: usize = 80;
pub const ROOM_PLACEMENT_ATTEMPTS_PER_ROOM: usize = 40;

pub const MIN_CORRIDOR: i32 = 2;
pub const MAX_CORRIDOR: i32 = 3;
pub const EXTRA_LINK_DIVISOR: usize = 5;
pub const BOSS_BAND: i32 = 3;

pub const MAX_REPAIR_ITERATIONS: usize = 32;
pub const REPAIR_TARGET_CANDIDATES: usize = 256;
pub const FINALIZE_ROUNDS: usize = 6;
pub const MAX_CORNER_PASSES: usize = 8;

pub const FREE_TILE_ATTEMPTS: usize = 24;
pub const PATIENT_TRIPLES: usize = 7;
pub const TRIPLE_RADIUS: i32 = 4;
pub const ELEVATOR_PAIR_RADIUS: i32 = 4;
pub const BROKEN_LIGHT_CHANCE: f64 = 0.15;

pub fn get_level_side(level: u32) -> i32 {
    if level <= 1 {
        return BASE_LEVEL_SIDE;
    }
    if level == 2 {
        return BASE_LEVEL_SIDE * 2;
    }
    BASE_LEVEL_SIDE * 3
}

pub fn get_room_target(width: i32, height: i32) -> usize {
    let by_area = (width as i64 * height as i64 / ROOM_AREA_PER_ROOM as i64) as usize;
    by_area.clamp(MIN_ROOM_TARGET, MAX_ROOM_TARGET)
}

pub fn get_room_side_range(level: u32, width: i32, height: i32) -> (i32, i32) {
    let tier = level.clamp(1, 3) as i32;
    let max_side = 18 + 6 * (tier - 1);
    let fit = (width.min(height) - 2 * MAP_MARGIN) / 3;
    (ROOM_MIN_SIDE, max_side.min(fit).max(ROOM_MIN_SIDE))
}

pub fn get_enemies_per_room(level: u32) -> usize {
    level as usize
}

pub fn get_elevator_pairs(level: u32) -> usize {
    level.clamp(1, 3) as usize
}
