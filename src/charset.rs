use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::types::{Cell, Placement, PlacementKind, SpawnerKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Charset {
    pub wall: char,
    pub floor: char,
    pub door: char,
    pub boss_door: char,
    pub start: char,
    pub phone: char,
    pub boss: char,
    pub light: char,
    pub broken_light: char,
    pub elevator: char,
    pub elevator_closed: char,
    pub mosquito: char,
    pub rat: char,
    pub staff: char,
    pub cart: char,
    pub patient: char,
    pub pill: char,
    pub bell: char,
}

impl Default for Charset {
    fn default() -> Self {
        Self {
            wall: '#',
            floor: '.',
            door: 'd',
            boss_door: 'D',
            start: 'S',
            phone: 'T',
            boss: 'X',
            light: 'L',
            broken_light: 'l',
            elevator: 'E',
            elevator_closed: 'e',
            mosquito: 'M',
            rat: 'R',
            staff: 'N',
            cart: 'C',
            patient: 'p',
            pill: 'i',
            bell: 'b',
        }
    }
}

impl Charset {
    fn cell_fields(&self) -> [(&'static str, char); 4] {
        [
            ("wall", self.wall),
            ("floor", self.floor),
            ("door", self.door),
            ("bossDoor", self.boss_door),
        ]
    }

    fn placement_fields(&self) -> [(&'static str, char); 14] {
        [
            ("start", self.start),
            ("phone", self.phone),
            ("boss", self.boss),
            ("light", self.light),
            ("brokenLight", self.broken_light),
            ("elevator", self.elevator),
            ("elevatorClosed", self.elevator_closed),
            ("mosquito", self.mosquito),
            ("rat", self.rat),
            ("staff", self.staff),
            ("cart", self.cart),
            ("patient", self.patient),
            ("pill", self.pill),
            ("bell", self.bell),
        ]
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        let cells = self.cell_fields();
        let placements = self.placement_fields();
        for &(field, symbol) in cells.iter().chain(placements.iter()) {
            if !symbol.is_ascii_graphic() {
                return Err(GenerateError::InvalidSymbol { field, symbol });
            }
        }
        for (idx, &(first, symbol)) in cells.iter().enumerate() {
            let later_cells = cells.iter().skip(idx + 1);
            for &(second, other) in later_cells.chain(placements.iter()) {
                if symbol == other {
                    return Err(GenerateError::SymbolCollision {
                        first,
                        second,
                        symbol,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn cell_symbol(&self, cell: Cell) -> char {
        match cell {
            Cell::Wall => self.wall,
            Cell::Floor => self.floor,
            Cell::Door => self.door,
            Cell::BossDoor => self.boss_door,
        }
    }

    pub fn placement_symbol(&self, placement: &Placement) -> Option<char> {
        let options = &placement.options;
        match placement.kind {
            PlacementKind::Player => Some(self.start),
            PlacementKind::Phone => Some(self.phone),
            PlacementKind::Door => None,
            PlacementKind::Boss => Some(self.boss),
            PlacementKind::Light => {
                if options.broken.unwrap_or(false) {
                    Some(self.broken_light)
                } else {
                    Some(self.light)
                }
            }
            PlacementKind::Spawner => Some(match options.spawner {
                Some(SpawnerKind::Mosquito) => self.mosquito,
                Some(SpawnerKind::Rat) => self.rat,
                Some(SpawnerKind::Cart) => self.cart,
                Some(SpawnerKind::Nurse) | Some(SpawnerKind::Celador) | None => self.staff,
            }),
            PlacementKind::Elevator => {
                if options.active.unwrap_or(true) {
                    Some(self.elevator)
                } else {
                    Some(self.elevator_closed)
                }
            }
            PlacementKind::Patient => Some(self.patient),
            PlacementKind::Pill => Some(self.pill),
            PlacementKind::Bell => Some(self.bell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlacementOptions;

    #[test]
    fn default_charset_is_valid() {
        assert_eq!(Charset::default().validate(), Ok(()));
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let charset: Charset =
            serde_json::from_str(r#"{"wall":"W","bossDoor":"B"}"#).expect("charset should parse");
        assert_eq!(charset.wall, 'W');
        assert_eq!(charset.boss_door, 'B');
        assert_eq!(charset.floor, '.');
        assert_eq!(charset.validate(), Ok(()));
    }

    #[test]
    fn colliding_cell_symbols_are_rejected() {
        let charset = Charset {
            door: '.',
            ..Charset::default()
        };
        assert_eq!(
            charset.validate(),
            Err(GenerateError::SymbolCollision {
                first: "floor",
                second: "door",
                symbol: '.',
            })
        );
    }

    #[test]
    fn placement_symbol_may_not_reuse_floor() {
        let charset = Charset {
            cart: '.',
            ..Charset::default()
        };
        assert!(matches!(
            charset.validate(),
            Err(GenerateError::SymbolCollision { second: "cart", .. })
        ));
    }

    #[test]
    fn whitespace_symbol_is_rejected() {
        let charset = Charset {
            wall: ' ',
            ..Charset::default()
        };
        assert!(matches!(
            charset.validate(),
            Err(GenerateError::InvalidSymbol { field: "wall", .. })
        ));
    }

    #[test]
    fn broken_light_and_closed_elevator_use_alternate_symbols() {
        let charset = Charset::default();
        let light = Placement {
            kind: PlacementKind::Light,
            tile_x: 0,
            tile_y: 0,
            options: PlacementOptions {
                broken: Some(true),
                ..PlacementOptions::default()
            },
        };
        let elevator = Placement {
            kind: PlacementKind::Elevator,
            tile_x: 0,
            tile_y: 0,
            options: PlacementOptions {
                active: Some(false),
                ..PlacementOptions::default()
            },
        };
        assert_eq!(charset.placement_symbol(&light), Some('l'));
        assert_eq!(charset.placement_symbol(&elevator), Some('e'));
    }
}
