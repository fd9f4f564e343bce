//! Grid layout for the atlas.
//!
//! Every glyph gets a cell of the same size (the largest width and the
//! largest height over the whole set), cells are filled in glyph order and
//! the final canvas is the smallest power-of-two square that holds the grid.
//!
//! The grid has `ceil(sqrt(n))` columns and `floor(sqrt(n))` rows, and a
//! glyph's row is its index divided by the row count, not the column count.
//! When `n` is not a perfect square the last glyphs therefore land below the
//! nominal grid. Existing atlases and their metadata depend on exactly these
//! coordinates, so the formula is kept as is.

use log::debug;

use crate::{error::AtlasError, raster::Glyph};

/// Top-left corner of a glyph inside the atlas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Side of the square output image; always a power of two.
    pub canvas_size: u32,
    /// One entry per glyph, same order as the glyph slice.
    pub placements: Vec<Placement>,
}

impl AtlasLayout {
    /// Width of the packed grid before power-of-two padding.
    pub fn packed_width(&self) -> u32 {
        self.columns * self.cell_width
    }

    /// Height of the packed grid before power-of-two padding.
    pub fn packed_height(&self) -> u32 {
        self.rows * self.cell_height
    }
}

/// `(columns, rows)` for `count` glyphs. Zero glyphs gives `(0, 0)`.
pub fn grid_dimensions(count: usize) -> (u32, u32) {
    let n = count as u64;
    let floor = isqrt(n);
    let ceil = if floor * floor == n { floor } else { floor + 1 };
    (ceil as u32, floor as u32)
}

/// Largest glyph width and largest glyph height, taken independently.
pub fn cell_size(glyphs: &[Glyph]) -> (u32, u32) {
    glyphs
        .iter()
        .fold((0, 0), |(w, h), g| (w.max(g.width()), h.max(g.height())))
}

/// Smallest power of two, at least 2, covering both packed dimensions.
pub fn canvas_size(packed_width: u32, packed_height: u32) -> u32 {
    packed_width.max(packed_height).max(2).next_power_of_two()
}

/// Position of glyph `index` on a grid of `columns` x `rows` cells.
pub fn cell_origin(index: usize, columns: u32, rows: u32, cell_width: u32, cell_height: u32) -> Placement {
    let i = index as u32;
    let col = i % columns;
    let row = i / rows;
    debug!("{i}: {col} x {row}");
    Placement { x: col * cell_width, y: row * cell_height }
}

/// Lay out `glyphs` in the order given.
pub fn compute_layout(glyphs: &[Glyph]) -> Result<AtlasLayout, AtlasError> {
    let (columns, rows) = grid_dimensions(glyphs.len());
    if rows == 0 {
        return Err(AtlasError::EmptyGlyphSet);
    }
    let (cell_width, cell_height) = cell_size(glyphs);
    let placements = (0..glyphs.len())
        .map(|i| cell_origin(i, columns, rows, cell_width, cell_height))
        .collect();
    let canvas_size = canvas_size(columns * cell_width, rows * cell_height);
    Ok(AtlasLayout { columns, rows, cell_width, cell_height, canvas_size, placements })
}

fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    // f64 rounding can be off by one near large squares.
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn uniform(n: usize, w: u32, h: u32) -> Vec<Glyph> {
        (0..n).map(|i| Glyph::blank(char::from_u32(0x21 + i as u32).unwrap(), w, h)).collect()
    }

    #[test]
    fn grid_formula_matches_sqrt() {
        for n in 1..=500usize {
            let (cols, rows) = grid_dimensions(n);
            let s = (n as f64).sqrt();
            assert_eq!(cols, s.ceil() as u32, "columns for n={n}");
            assert_eq!(rows, s.floor() as u32, "rows for n={n}");
        }
        assert_eq!(grid_dimensions(0), (0, 0));
        assert_eq!(grid_dimensions(2), (2, 1));
        assert_eq!(grid_dimensions(5), (3, 2));
    }

    #[test]
    fn isqrt_exact_near_large_squares() {
        for r in [1u64, 3, 46_340, 65_535, 3_037_000_499] {
            assert_eq!(isqrt(r * r), r);
            assert_eq!(isqrt(r * r - 1), r - 1);
            assert_eq!(isqrt(r * r + 1), r);
        }
    }

    #[test]
    fn every_index_gets_a_unique_cell() {
        for n in 1..=300usize {
            let layout = compute_layout(&uniform(n, 3, 4)).unwrap();
            let mut seen = HashSet::new();
            for (i, p) in layout.placements.iter().enumerate() {
                assert!(p.x / 3 < layout.columns, "column out of range n={n} i={i}");
                assert_eq!(p.x, (i as u32 % layout.columns) * 3);
                assert_eq!(p.y, (i as u32 / layout.rows) * 4);
                assert!(seen.insert((p.x, p.y)), "duplicate cell n={n} i={i}");
            }
        }
    }

    #[test]
    fn canvas_is_smallest_covering_power_of_two() {
        assert_eq!(canvas_size(0, 0), 2);
        assert_eq!(canvas_size(1, 0), 2);
        assert_eq!(canvas_size(2, 1), 2);
        assert_eq!(canvas_size(3, 2), 4);
        assert_eq!(canvas_size(20, 24), 32);
        assert_eq!(canvas_size(64, 64), 64);
        assert_eq!(canvas_size(65, 10), 128);
        for n in 1..=200usize {
            let layout = compute_layout(&uniform(n, 7, 11)).unwrap();
            let side = layout.canvas_size;
            let need = layout.packed_width().max(layout.packed_height());
            assert!(side.is_power_of_two() && side >= need);
            assert!(side == 2 || side / 2 < need, "not minimal for n={n}");
        }
    }

    #[test]
    fn four_glyph_scenario() {
        let layout = compute_layout(&uniform(4, 10, 12)).unwrap();
        assert_eq!((layout.columns, layout.rows), (2, 2));
        assert_eq!((layout.cell_width, layout.cell_height), (10, 12));
        assert_eq!((layout.packed_width(), layout.packed_height()), (20, 24));
        assert_eq!(layout.canvas_size, 32);
        let xy: Vec<(u32, u32)> = layout.placements.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(xy, vec![(0, 0), (10, 0), (0, 12), (10, 12)]);
    }

    #[test]
    fn single_glyph_scenario() {
        let layout = compute_layout(&uniform(1, 9, 14)).unwrap();
        assert_eq!((layout.columns, layout.rows), (1, 1));
        assert_eq!(layout.placements, vec![Placement { x: 0, y: 0 }]);
        assert_eq!(layout.canvas_size, 16);
    }

    #[test]
    fn empty_set_is_reported_not_divided() {
        assert!(matches!(compute_layout(&[]), Err(AtlasError::EmptyGlyphSet)));
    }

    #[test]
    fn cell_is_max_per_axis() {
        let glyphs = vec![Glyph::blank('a', 4, 20), Glyph::blank('b', 13, 6), Glyph::blank(' ', 5, 0)];
        assert_eq!(cell_size(&glyphs), (13, 20));
    }

    #[test]
    fn overflow_rows_extend_below_nominal_grid() {
        // n=3: 2 columns, 1 row; third glyph sits on row 2.
        let layout = compute_layout(&uniform(3, 8, 8)).unwrap();
        assert_eq!((layout.columns, layout.rows), (2, 1));
        assert_eq!(layout.placements[2], Placement { x: 0, y: 16 });
        assert_eq!(layout.canvas_size, 16);
    }

    #[test]
    fn zero_sized_glyphs_still_occupy_cells() {
        let glyphs = vec![Glyph::blank(' ', 6, 12), Glyph::blank('!', 3, 12), Glyph::blank('"', 0, 0), Glyph::blank('#', 5, 12)];
        let layout = compute_layout(&glyphs).unwrap();
        assert_eq!(layout.cell_width, 6);
        assert_eq!(layout.placements[2], Placement { x: 0, y: 12 });
    }
}
