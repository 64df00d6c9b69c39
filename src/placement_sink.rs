use crate::types::{Placement, PlacementKind, PlacementOptions, Vec2};

pub trait PlacementSink {
    fn place_player(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_phone(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_door(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_boss(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_light(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_spawner(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_elevator(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_patient(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_pill(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
    fn place_bell(&mut self, _tile: Vec2, _options: &PlacementOptions) {}
}

pub struct NoopSink;

impl PlacementSink for NoopSink {}

pub fn dispatch_placements<S: PlacementSink + ?Sized>(placements: &[Placement], sink: &mut S) {
    for placement in placements {
        let tile = placement.tile();
        let options = &placement.options;
        match placement.kind {
            PlacementKind::Player => sink.place_player(tile, options),
            PlacementKind::Phone => sink.place_phone(tile, options),
            PlacementKind::Door => sink.place_door(tile, options),
            PlacementKind::Boss => sink.place_boss(tile, options),
            PlacementKind::Light => sink.place_light(tile, options),
            PlacementKind::Spawner => sink.place_spawner(tile, options),
            PlacementKind::Elevator => sink.place_elevator(tile, options),
            PlacementKind::Patient => sink.place_patient(tile, options),
            PlacementKind::Pill => sink.place_pill(tile, options),
            PlacementKind::Bell => sink.place_bell(tile, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, Vec2)>,
    }

    impl PlacementSink for Recorder {
        fn place_player(&mut self, tile: Vec2, _options: &PlacementOptions) {
            self.calls.push(("player", tile));
        }

        fn place_door(&mut self, tile: Vec2, options: &PlacementOptions) {
            let name = if options.boss == Some(true) { "boss_door" } else { "door" };
            self.calls.push((name, tile));
        }
    }

    fn placement(kind: PlacementKind, x: i32, y: i32, boss: bool) -> Placement {
        Placement {
            kind,
            tile_x: x,
            tile_y: y,
            options: PlacementOptions {
                boss: Some(boss),
                ..PlacementOptions::default()
            },
        }
    }

    #[test]
    fn dispatch_routes_by_kind_and_keeps_order() {
        let placements = vec![
            placement(PlacementKind::Player, 1, 2, false),
            placement(PlacementKind::Bell, 3, 3, false),
            placement(PlacementKind::Door, 4, 5, true),
            placement(PlacementKind::Door, 6, 7, false),
        ];
        let mut recorder = Recorder::default();
        dispatch_placements(&placements, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec![
                ("player", Vec2::new(1, 2)),
                ("boss_door", Vec2::new(4, 5)),
                ("door", Vec2::new(6, 7)),
            ]
        );
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let placements = vec![placement(PlacementKind::Pill, 0, 0, false)];
        dispatch_placements(&placements, &mut NoopSink);
    }
}
