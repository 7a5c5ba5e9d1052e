//! Maps a digest onto a left-right mirrored occupancy grid.

use std::fmt;

use crate::error::{IdenticonError, Result};

/// Low digest bits reserved for a foreground color.  They are shifted away
/// before any shape bits are consumed.
pub const COLOR_BITS: u32 = 24;

pub const MIN_GRID_SIZE: usize = 4;
pub const MAX_GRID_SIZE: usize = 9;

/// A grid dimension known to be within `[MIN_GRID_SIZE, MAX_GRID_SIZE]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridSize(usize);

impl GridSize {
    pub fn new(n: i32) -> Result<Self> {
        match usize::try_from(n) {
            Ok(n) if (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&n) => Ok(Self(n)),
            _ => Err(IdenticonError::InvalidGridSize(n)),
        }
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Number of columns that carry hash bits: the left half, plus the
    /// middle column when the size is odd.
    pub fn half_width(self) -> usize {
        (self.0 + 1) / 2
    }

    /// Number of digest bits the mapping visits.
    pub fn cell_count(self) -> usize {
        self.0 * self.half_width()
    }
}

/// An `N x N` grid of filled/empty cells, always mirror-symmetric about the
/// vertical center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,

    // Row-major, `size * size` long.
    cells: Vec<bool>,
}

impl Grid {
    /// Builds the grid for `digest`.
    ///
    /// Bits are consumed least-significant first, column by column (rows
    /// varying fastest) across the left half.  Each set bit fills its cell
    /// and the mirrored cell.  Cells past the 40 available shape bits stay
    /// empty.
    pub fn from_digest(digest: u64, size: GridSize) -> Self {
        let n = size.get();
        let mut grid = Self {
            size: n,
            cells: vec![false; n * n],
        };

        let mut bits = digest >> COLOR_BITS;
        for col in 0..size.half_width() {
            for row in 0..n {
                if bits & 1 == 1 {
                    grid.cells[row * n + col] = true;
                    grid.cells[row * n + (n - 1 - col)] = true;
                }
                bits >>= 1;
            }
        }

        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(self.size)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                f.write_str(if cell { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanorand::{Rng, WyRand};

    fn size(n: i32) -> GridSize {
        GridSize::new(n).unwrap()
    }

    fn to_bits(grid: &Grid) -> Vec<Vec<u8>> {
        grid.rows()
            .map(|row| row.iter().map(|&c| c as u8).collect())
            .collect()
    }

    #[test]
    fn grid_size_bounds() {
        for n in [i32::MIN, -1, 0, 2, 3, 10, 20, i32::MAX] {
            assert!(matches!(
                GridSize::new(n),
                Err(IdenticonError::InvalidGridSize(m)) if m == n
            ));
        }
        for n in 4..=9 {
            assert_eq!(GridSize::new(n).unwrap().get(), n as usize);
        }
    }

    #[test]
    fn half_width_uses_integer_division() {
        let widths: Vec<usize> = (4..=9).map(|n| size(n).half_width()).collect();
        assert_eq!(widths, [2, 3, 3, 4, 4, 5]);
        assert_eq!(size(9).cell_count(), 45);
    }

    #[test]
    fn color_bits_are_ignored() {
        let empty = Grid::from_digest(0x0000_0000_00ff_ffff, size(7));
        assert_eq!(empty.filled_count(), 0);
    }

    #[test]
    fn bit_order() {
        // First shape bit is row 0, column 0 (and its mirror).
        let g = Grid::from_digest(1 << COLOR_BITS, size(5));
        assert!(g.get(0, 0) && g.get(0, 4));
        assert_eq!(g.filled_count(), 2);

        // Sixth shape bit is row 0 of the second column.
        let g = Grid::from_digest(1 << (COLOR_BITS + 5), size(5));
        assert!(g.get(0, 1) && g.get(0, 3));
        assert_eq!(g.filled_count(), 2);

        // Eleventh shape bit is row 0 of the middle column.
        let g = Grid::from_digest(1 << (COLOR_BITS + 10), size(5));
        assert!(g.get(0, 2));
        assert_eq!(g.filled_count(), 1);
    }

    #[test]
    fn all_ones_large_grid_runs_out_of_bits() {
        // 9 x 5 = 45 cells visited, but only 40 shape bits exist, so the
        // bottom five cells of the middle column stay empty.
        let g = Grid::from_digest(u64::MAX, size(9));
        for row in 0..9 {
            for col in 0..9 {
                let expected = !(col == 4 && row >= 4);
                assert_eq!(g.get(row, col), expected, "({}, {})", row, col);
            }
        }
    }

    #[test]
    fn pinned_patterns() {
        let digest = 0xfa539ce35cb75aa8;

        assert_eq!(
            to_bits(&Grid::from_digest(digest, size(4))),
            [[0, 1, 1, 0], [0, 0, 0, 0], [1, 1, 1, 1], [1, 0, 0, 1]]
        );

        assert_eq!(
            to_bits(&Grid::from_digest(digest, size(7))),
            [
                [0, 0, 1, 0, 1, 0, 0],
                [0, 1, 1, 0, 1, 1, 0],
                [1, 1, 0, 1, 0, 1, 1],
                [1, 0, 0, 1, 0, 0, 1],
                [1, 0, 1, 1, 1, 0, 1],
                [0, 0, 1, 0, 1, 0, 0],
                [1, 1, 1, 0, 1, 1, 1],
            ]
        );
    }

    #[test]
    fn symmetric_for_random_digests() {
        let mut rng = WyRand::new_seed(0x5eed);
        for _ in 0..2000 {
            let digest: u64 = rng.generate();
            for n in 4..=9 {
                let g = Grid::from_digest(digest, size(n));
                let n = n as usize;
                for row in 0..n {
                    for col in 0..n {
                        assert_eq!(g.get(row, col), g.get(row, n - 1 - col));
                    }
                }
            }
        }
    }

    #[test]
    fn display() {
        let g = Grid::from_digest(0xfa539ce35cb75aa8, size(4));
        assert_eq!(g.to_string(), ".##.\n....\n####\n#..#\n");
    }
}
