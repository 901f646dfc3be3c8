//! Owned row-major 2D table.
//!
//! A [`Grid`] is one allocation of `rows * cols` elements addressed by
//! `(row, col)`. Every access is bounds-checked against both dimensions, so a
//! column overflow can never silently land in the next row.

/// Row-major 2D table with checked indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    cells: Box<[T]>,
    rows: usize,
    cols: usize,
}

impl<T> Grid<T> {
    /// Builds a grid by calling `init(row, col)` for every cell.
    #[must_use]
    pub fn from_fn(rows: usize, cols: usize, mut init: impl FnMut(usize, usize) -> T) -> Self {
        let cells = (0..rows * cols).map(|i| init(i / cols, i % cols)).collect();
        Self { cells, rows, cols }
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.offset(row, col).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.offset(row, col).map(|i| &mut self.cells[i])
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[T]> {
        (row < self.rows).then(|| &self.cells[row * self.cols..(row + 1) * self.cols])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.cells.iter_mut()
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

impl<T: Default> Grid<T> {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_overflow_is_rejected() {
        let grid = Grid::from_fn(2, 3, |r, c| r * 10 + c);
        assert_eq!(grid.get(1, 2), Some(&12));
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_row_slices() {
        let grid = Grid::from_fn(2, 2, |r, c| (r, c));
        assert_eq!(grid.row(1), Some(&[(1, 0), (1, 1)][..]));
        assert_eq!(grid.row(2), None);
    }
}
