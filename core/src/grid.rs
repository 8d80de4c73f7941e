use std::ops::{Index, IndexMut};

use crate::TerrainError;

// Rectangular row-major grid, addressed as `grid[(x, y)]`.
// Every constructor goes through a fallible reservation so oversized
// requests come back as `AllocationFailure` instead of aborting.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

// Elevation values, expected to stay inside [0, 1].
pub type ElevationGrid = Grid<f64>;

// `true` where a cell is water.
pub type WaterMask = Grid<bool>;

fn checked_len(width: usize, height: usize) -> Result<usize, TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::InvalidDimension(format!(
            "grid must be at least 1×1, got {width}×{height}"
        )));
    }
    width
        .checked_mul(height)
        .ok_or(TerrainError::AllocationFailure { cells: usize::MAX })
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, TerrainError> {
        let len = checked_len(width, height)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| TerrainError::AllocationFailure { cells: len })?;
        cells.resize(len, value);
        Ok(Self {
            width,
            height,
            cells,
        })
    }
}

impl<T> Grid<T> {
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Result<Self, TerrainError> {
        let len = checked_len(width, height)?;
        if cells.len() != len {
            return Err(TerrainError::InvalidDimension(format!(
                "{width}×{height} grid needs {len} cells, got {}",
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    // Build from nested rows (`rows[y][x]`); all rows must share one length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, TerrainError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(TerrainError::InvalidDimension(format!(
                "row {bad} has {} cells, expected {width}",
                rows[bad].len()
            )));
        }
        Self::from_vec(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    // Same-shape grid built cell by cell.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        &self.cells[self.offset(x, y)]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        let i = self.offset(x, y);
        &mut self.cells[i]
    }
}

#[cfg(test)]
mod tests {
    use super::Grid;
    use crate::TerrainError;

    #[test]
    fn grid_row_major_layout() {
        let g = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert_eq!(g[(2, 0)], 3);
        assert_eq!(g[(0, 1)], 4);
        assert_eq!(g.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn grid_rejects_zero_dimensions() {
        assert!(matches!(
            Grid::filled(0, 4, 0.0),
            Err(TerrainError::InvalidDimension(_))
        ));
        assert!(matches!(
            Grid::filled(4, 0, 0.0),
            Err(TerrainError::InvalidDimension(_))
        ));
    }

    #[test]
    fn grid_rejects_ragged_rows() {
        let res = Grid::from_rows(vec![vec![0.0, 1.0], vec![0.5]]);
        assert!(matches!(res, Err(TerrainError::InvalidDimension(_))));
    }

    #[test]
    fn grid_huge_request_is_allocation_failure() {
        let res = Grid::filled(usize::MAX / 2, 3, 0u8);
        assert!(matches!(res, Err(TerrainError::AllocationFailure { .. })));
    }

    #[test]
    fn grid_border_detection() {
        let g = Grid::filled(4, 3, false).unwrap();
        assert!(g.is_border(0, 1));
        assert!(g.is_border(3, 1));
        assert!(g.is_border(2, 2));
        assert!(!g.is_border(1, 1));
        assert!(g.contains(3, 2));
        assert!(!g.contains(4, 0));
        assert!(!g.contains(-1, 0));
    }
}
