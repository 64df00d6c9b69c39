use crate::charset::Charset;
use crate::types::Placement;

use super::grid::Grid;

pub fn render_ascii(grid: &Grid, placements: &[Placement], charset: &Charset) -> Vec<String> {
    let mut rows: Vec<Vec<char>> = grid
        .rows()
        .map(|row| row.iter().map(|cell| charset.cell_symbol(*cell)).collect())
        .collect();

    for placement in placements {
        let Some(symbol) = charset.placement_symbol(placement) else {
            continue;
        };
        if !grid.in_bounds(placement.tile_x, placement.tile_y) {
            continue;
        }
        rows[placement.tile_y as usize][placement.tile_x as usize] = symbol;
    }

    rows.into_iter().map(|row| row.into_iter().collect()).collect()
}
