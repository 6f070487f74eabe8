use vek::Vec2;

/// A cell of a [`TileGrid`] together with the coordinate inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileCoord {
    pub col: usize,
    pub row: usize,
    /// Position inside the tile, each component in [0, 1).
    pub local: Vec2<f32>,
}

/// Regular `cols x rows` grid over (s, t) parameter space.
///
/// Tiles are addressed row-major with row 0 at the low-t edge:
/// `index = row * cols + col`. For a 3x2 grid, indices 0..=2 run along the
/// bottom row left to right and 3..=5 along the top row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    pub cols: usize,
    pub rows: usize,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self { cols: 1, rows: 1 }
    }
}

/// Truncates a configured frequency to a tile count. Frequencies below one,
/// zero, negative or non-finite values all yield a single tile.
#[inline]
pub fn tile_count(freq: f32) -> usize {
    if freq.is_finite() && freq >= 1.0 {
        freq as usize
    } else {
        1
    }
}

/// A multiplicative frequency, with zero, negative and non-finite values
/// replaced by one.
#[inline]
pub fn frequency_or_one(freq: f32) -> f32 {
    if freq.is_finite() && freq > 0.0 {
        freq
    } else {
        1.0
    }
}

impl TileGrid {
    pub fn new(sfreq: f32, tfreq: f32) -> Self {
        Self {
            cols: tile_count(sfreq),
            rows: tile_count(tfreq),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major tile index. Out of range addresses wrap around the grid.
    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        (row % self.rows) * self.cols + (col % self.cols)
    }

    /// Resolves a continuous (s, t) to its tile. Coordinates outside [0, 1)
    /// are wrapped first, so the pattern repeats over the parameter plane.
    pub fn locate(&self, st: Vec2<f32>) -> TileCoord {
        let (col, x) = Self::axis(st.x, self.cols);
        let (row, y) = Self::axis(st.y, self.rows);
        TileCoord {
            col,
            row,
            local: Vec2::new(x, y),
        }
    }

    /// Centre of a tile in (s, t).
    #[inline]
    pub fn center(&self, col: usize, row: usize) -> Vec2<f32> {
        Vec2::new(
            (col as f32 + 0.5) / self.cols as f32,
            (row as f32 + 0.5) / self.rows as f32,
        )
    }

    #[inline]
    fn axis(c: f32, count: usize) -> (usize, f32) {
        let c = if c.is_finite() { c.rem_euclid(1.0) } else { 0.0 };
        let x = c * count as f32;
        let cell = x.floor();
        let index = (cell as usize).min(count - 1);
        (index, (x - cell).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_ordering() {
        let grid = TileGrid::new(3.0, 2.0);
        // Sub-tile centres of a 3x2 grid, in expected index order.
        let expected = [
            (Vec2::new(1.0 / 6.0, 0.25), 0),
            (Vec2::new(0.5, 0.25), 1),
            (Vec2::new(5.0 / 6.0, 0.25), 2),
            (Vec2::new(1.0 / 6.0, 0.75), 3),
            (Vec2::new(0.5, 0.75), 4),
            (Vec2::new(5.0 / 6.0, 0.75), 5),
        ];
        for (st, index) in expected {
            let tile = grid.locate(st);
            assert_eq!(grid.index(tile.col, tile.row), index);
        }
    }

    #[test]
    fn test_degenerate_frequencies() {
        assert_eq!(TileGrid::new(0.0, -3.0), TileGrid { cols: 1, rows: 1 });
        assert_eq!(TileGrid::new(f32::NAN, f32::INFINITY).len(), 1);
        assert_eq!(TileGrid::new(3.9, 2.1), TileGrid { cols: 3, rows: 2 });
    }

    #[test]
    fn test_frequency_or_one() {
        assert_eq!(frequency_or_one(0.5), 0.5);
        assert_eq!(frequency_or_one(0.0), 1.0);
        assert_eq!(frequency_or_one(-2.0), 1.0);
        assert_eq!(frequency_or_one(f32::NAN), 1.0);
        assert_eq!(frequency_or_one(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_wrapping_and_local_coordinates() {
        let grid = TileGrid::new(4.0, 4.0);
        let a = grid.locate(Vec2::new(0.3, 0.6));
        let b = grid.locate(Vec2::new(1.3, -0.4));
        assert_eq!((a.col, a.row), (b.col, b.row));
        assert!((a.local.x - 0.2).abs() < 1e-4);
        assert!((a.local.y - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_center_round_trips_through_locate() {
        let grid = TileGrid::new(5.0, 3.0);
        for row in 0..3 {
            for col in 0..5 {
                let tile = grid.locate(grid.center(col, row));
                assert_eq!((tile.col, tile.row), (col, row));
            }
        }
    }
}
