use crate::types::{Room, Side, Vec2};

use super::grid::Mask;

pub(super) fn manhattan(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub(super) fn ring_mask(rooms: &[Room], width: i32, height: i32) -> Mask {
    let mut mask = Mask::new(width, height);
    for room in rooms {
        for pos in room.rect.expanded(1).cells() {
            if room.rect.ring_contains(pos.x, pos.y) {
                mask.set(pos.x, pos.y);
            }
        }
    }
    mask
}

pub(super) fn interior_mask(rooms: &[Room], width: i32, height: i32) -> Mask {
    let mut mask = Mask::new(width, height);
    for room in rooms {
        mask.mark_rect(&room.rect);
    }
    mask
}

pub(super) fn side_facing(room: &Room, target: Vec2) -> Side {
    let center = room.center();
    let (dx, dy) = (target.x - center.x, target.y - center.y);
    if dx.abs() >= dy.abs() {
        if dx >= 0 {
            Side::Right
        } else {
            Side::Left
        }
    } else if dy >= 0 {
        Side::Bottom
    } else {
        Side::Top
    }
}
