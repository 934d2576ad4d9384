//! Grid topology: row-major index arithmetic and 4-neighbor enumeration.
//!
//! Cells are addressed by a linear index `i = row * cols + col`. Only
//! orthogonal neighbors exist, and nothing wraps around the borders.

/// Dimensions of a rectangular board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    pub cols: usize,
    pub rows: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn row(&self, i: usize) -> usize {
        i / self.cols
    }

    #[inline]
    pub fn col(&self, i: usize) -> usize {
        i % self.cols
    }

    /// Player 1's anchor (top-left).
    #[inline]
    pub fn first_anchor(&self) -> usize {
        0
    }

    /// Player 2's anchor (bottom-right).
    #[inline]
    pub fn last_anchor(&self) -> usize {
        self.len() - 1
    }

    /// Orthogonal neighbors of `i`, in the order west, east, north, south.
    #[inline]
    pub fn neighbors(&self, i: usize) -> Neighbors {
        let row = self.row(i);
        let col = self.col(i);
        let mut out = Neighbors {
            buf: [0; 4],
            len: 0,
            pos: 0,
        };
        if col > 0 {
            out.push(i - 1);
        }
        if col + 1 < self.cols {
            out.push(i + 1);
        }
        if row > 0 {
            out.push(i - self.cols);
        }
        if row + 1 < self.rows {
            out.push(i + self.cols);
        }
        out
    }
}

/// Stack-allocated iterator over at most four neighbor indices.
#[derive(Clone, Debug)]
pub struct Neighbors {
    buf: [usize; 4],
    len: u8,
    pos: u8,
}

impl Neighbors {
    #[inline]
    fn push(&mut self, i: usize) {
        self.buf[self.len as usize] = i;
        self.len += 1;
    }
}

impl Iterator for Neighbors {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.pos < self.len {
            let i = self.buf[self.pos as usize];
            self.pos += 1;
            Some(i)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.len - self.pos) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Neighbors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(grid: &Grid, i: usize) -> Vec<usize> {
        let mut v: Vec<usize> = grid.neighbors(i).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_index_roundtrip() {
        let grid = Grid::new(7, 3);
        for i in 0..grid.len() {
            assert_eq!(grid.index(grid.row(i), grid.col(i)), i);
        }
    }

    #[test]
    fn test_corner_neighbors() {
        let grid = Grid::new(4, 3);
        assert_eq!(sorted(&grid, 0), vec![1, 4]);
        assert_eq!(sorted(&grid, 3), vec![2, 7]);
        assert_eq!(sorted(&grid, 8), vec![4, 9]);
        assert_eq!(sorted(&grid, 11), vec![7, 10]);
    }

    #[test]
    fn test_no_wraparound_at_row_ends() {
        let grid = Grid::new(4, 3);
        // Index 4 starts row 1; index 3 (end of row 0) is not a neighbor.
        assert_eq!(sorted(&grid, 4), vec![0, 5, 8]);
        // Index 7 ends row 1; index 8 (start of row 2) is not a neighbor.
        assert_eq!(sorted(&grid, 7), vec![3, 6, 11]);
    }

    #[test]
    fn test_interior_has_four_neighbors() {
        let grid = Grid::new(3, 3);
        assert_eq!(grid.neighbors(4).len(), 4);
        assert_eq!(sorted(&grid, 4), vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_single_row_and_column() {
        let row = Grid::new(3, 1);
        assert_eq!(sorted(&row, 1), vec![0, 2]);
        let col = Grid::new(1, 3);
        assert_eq!(sorted(&col, 1), vec![0, 2]);
        let cell = Grid::new(1, 1);
        assert_eq!(cell.neighbors(0).count(), 0);
    }

    #[test]
    fn test_anchors() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.first_anchor(), 0);
        assert_eq!(grid.last_anchor(), 19);
    }
}
