use serde::ser::{Serialize, Serializer};

use crate::types::{Cell, Rect, Vec2};

/// Row-major tile buffer. Reads outside the grid see walls and writes
/// outside the grid are dropped, so passes can probe neighbours freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; (width.max(0) as usize) * (height.max(0) as usize)],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn is_border(&self, x: i32, y: i32) -> bool {
        x <= 0 || y <= 0 || x >= self.width - 1 || y >= self.height - 1
    }

    pub fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn get(&self, x: i32, y: i32) -> Cell {
        if !self.in_bounds(x, y) {
            return Cell::Wall;
        }
        self.cells[self.index(x, y)]
    }

    pub fn at(&self, pos: Vec2) -> Cell {
        self.get(pos.x, pos.y)
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
    }

    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_open()
    }

    pub fn fill(&mut self, rect: &Rect, cell: Cell) {
        for pos in rect.cells() {
            self.set(pos.x, pos.y, cell);
        }
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|value| **value == cell).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

#[derive(Clone, Debug)]
pub struct Mask {
    width: i32,
    height: i32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width.max(0) as usize) * (height.max(0) as usize)],
        }
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.bits[(y * self.width + x) as usize] = true;
    }

    pub fn mark_rect(&mut self, rect: &Rect) {
        for pos in rect.cells() {
            self.set(pos.x, pos.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_as_wall_and_writes_are_ignored() {
        let mut grid = Grid::new(4, 3);
        grid.set(-1, 0, Cell::Floor);
        grid.set(4, 2, Cell::Floor);
        assert_eq!(grid.get(-1, 0), Cell::Wall);
        assert_eq!(grid.count(Cell::Floor), 0);
        grid.set(1, 1, Cell::Floor);
        assert!(grid.is_open(1, 1));
        assert_eq!(grid.count(Cell::Floor), 1);
    }

    #[test]
    fn serializes_as_rows() {
        let mut grid = Grid::new(2, 2);
        grid.set(1, 0, Cell::Door);
        let json = serde_json::to_value(&grid).expect("grid should serialize");
        assert_eq!(json[0][1], "door");
        assert_eq!(json[1][0], "wall");
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn border_detection_covers_outer_ring() {
        let grid = Grid::new(5, 5);
        assert!(grid.is_border(0, 2));
        assert!(grid.is_border(4, 4));
        assert!(!grid.is_border(1, 1));
        assert!(!grid.is_border(3, 3));
    }
}
