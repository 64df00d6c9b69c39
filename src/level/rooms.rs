use crate::constants::{
    get_room_side_range, get_room_target, MAP_MARGIN, MIN_ROOM_GAP,
    ROOM_PLACEMENT_ATTEMPTS_PER_ROOM, ROOM_MIN_SIDE,
};
use crate::rng::Rng;
use crate::types::{Rect, Room, RoomKind};

#[derive(Clone, Debug)]
pub struct RoomLayout {
    pub rooms: Vec<Room>,
    pub target: usize,
    pub control: usize,
    pub boss: usize,
    pub used_fallback: bool,
}

pub fn respects_gap(candidate: &Rect, other: &Rect) -> bool {
    !candidate
        .expanded(1 + MIN_ROOM_GAP)
        .intersects(&other.expanded(1))
}

pub fn place_rooms(level: u32, width: i32, height: i32, rng: &mut Rng) -> RoomLayout {
    let target = get_room_target(width, height);
    let (min_side, max_side) = get_room_side_range(level, width, height);
    let mut rects: Vec<Rect> = Vec::new();

    for _ in 0..target * ROOM_PLACEMENT_ATTEMPTS_PER_ROOM {
        if rects.len() >= target {
            break;
        }
        let w = rng.int(min_side, max_side);
        let h = rng.int(min_side, max_side);
        let max_x = width - MAP_MARGIN - w;
        let max_y = height - MAP_MARGIN - h;
        if max_x < MAP_MARGIN || max_y < MAP_MARGIN {
            continue;
        }
        let candidate = Rect::new(rng.int(MAP_MARGIN, max_x), rng.int(MAP_MARGIN, max_y), w, h);
        if rects.iter().all(|other| respects_gap(&candidate, other)) {
            rects.push(candidate);
        }
    }

    let used_fallback = rects.len() < 2;
    if used_fallback {
        rects = corner_fallback(width, height);
    }

    let mut rooms: Vec<Room> = rects
        .into_iter()
        .enumerate()
        .map(|(id, rect)| Room::new(id, rect))
        .collect();

    let control = rng.pick_index(rooms.len());
    let control_center = rooms[control].center();
    let mut boss = if control == 0 { 1 } else { 0 };
    for room in &rooms {
        if room.id == control {
            continue;
        }
        if room.center().dist2(control_center) > rooms[boss].center().dist2(control_center) {
            boss = room.id;
        }
    }
    rooms[control].kind = RoomKind::Control;
    rooms[boss].kind = RoomKind::Boss;

    RoomLayout {
        rooms,
        target,
        control,
        boss,
        used_fallback,
    }
}

fn corner_fallback(width: i32, height: i32) -> Vec<Rect> {
    let side = ROOM_MIN_SIDE;
    vec![
        Rect::new(MAP_MARGIN, MAP_MARGIN, side, side),
        Rect::new(
            width - MAP_MARGIN - side,
            height - MAP_MARGIN - side,
            side,
            side,
        ),
    ]
}
