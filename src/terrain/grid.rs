//! Rectangular height field.

use crate::error::{Result, TerrainError};
use crate::geometry::neighbors::{neighbors_clamped, Connectivity};

/// A `width x height` elevation raster in row-major order.
///
/// Cell `i` sits at `x = i % width`, `y = i / width`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    /// Elevation values, one per cell.
    pub elevation: Vec<f64>,
    /// Multiplier applied when elevations are turned into mesh heights.
    /// Imported grids already carry their scale in `elevation` and use 1.0.
    pub vertical_scale: f64,
}

impl HeightGrid {
    /// Creates a flat grid at elevation 0.0.
    pub fn new(width: usize, height: usize, vertical_scale: f64) -> Result<Self> {
        Self::from_elevation(width, height, vec![0.0; width * height], vertical_scale)
    }

    /// Wraps an existing elevation buffer.
    ///
    /// Fails with [`TerrainError::InvalidDimensions`] if either side is zero or
    /// the buffer length is not `width * height`.
    pub fn from_elevation(width: usize, height: usize, elevation: Vec<f64>, vertical_scale: f64) -> Result<Self> {
        if width == 0 || height == 0 || elevation.len() != width * height {
            return Err(TerrainError::InvalidDimensions {
                width,
                height,
                cells: elevation.len(),
            });
        }
        Ok(Self {
            width,
            height,
            elevation,
            vertical_scale,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.elevation.len()
    }

    /// Always false for a constructed grid; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.elevation.is_empty()
    }

    /// Converts a cell index to `(x, y)`, or `None` if out of range.
    pub fn index_to_xy(&self, i: usize) -> Option<(usize, usize)> {
        (i < self.len()).then(|| (i % self.width, i / self.width))
    }

    /// Converts `(x, y)` to a cell index, or `None` if out of range.
    pub fn xy_to_index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Returns the elevation at `(x, y)`.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.elevation[y * self.width + x]
    }

    /// Sets the elevation at `(x, y)`.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        debug_assert!(x < self.width && y < self.height);
        self.elevation[y * self.width + x] = value;
    }

    /// Edge-clamped 8-neighbours of cell `i` in N, NE, E, SE, S, SW, W, NW order.
    ///
    /// Returns an empty list for an out-of-range index.
    pub fn neighbours(&self, i: usize) -> Vec<usize> {
        self.neighbours_with(i, Connectivity::Eight)
    }

    /// Edge-clamped neighbours of cell `i` for the given connectivity.
    pub fn neighbours_with(&self, i: usize, connectivity: Connectivity) -> Vec<usize> {
        match self.index_to_xy(i) {
            Some((x, y)) => neighbors_clamped(self.width, self.height, x, y, connectivity)
                .map(|(_, n)| n)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns `(min, max)` elevation.
    pub fn height_range(&self) -> (f64, f64) {
        field_range(&self.elevation)
    }

    /// Sum of all elevations.
    pub fn total_mass(&self) -> f64 {
        self.elevation.iter().sum()
    }

    /// Iterates over `(x, y)` coordinates in index order.
    pub fn cell_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width;
        (0..self.height).flat_map(move |y| (0..w).map(move |x| (x, y)))
    }
}

/// Returns `(min, max)` of a scalar field; `(0.0, 0.0)` for an empty slice.
pub fn field_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = HeightGrid::new(8, 4, 100.0).unwrap();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.len(), 32);
        assert!(grid.elevation.iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            HeightGrid::new(0, 4, 1.0),
            Err(TerrainError::InvalidDimensions { .. })
        ));
        assert!(HeightGrid::new(3, 0, 1.0).is_err());
        assert!(HeightGrid::from_elevation(2, 2, vec![0.0; 3], 1.0).is_err());
    }

    #[test]
    fn test_index_xy_conversion() {
        let grid = HeightGrid::new(5, 3, 1.0).unwrap();
        assert_eq!(grid.index_to_xy(7), Some((2, 1)));
        assert_eq!(grid.xy_to_index(2, 1), Some(7));
        assert_eq!(grid.index_to_xy(15), None);
        assert_eq!(grid.xy_to_index(5, 0), None);
        assert_eq!(grid.xy_to_index(0, 3), None);
        for i in 0..grid.len() {
            let (x, y) = grid.index_to_xy(i).unwrap();
            assert_eq!(grid.xy_to_index(x, y), Some(i));
        }
    }

    #[test]
    fn test_get_set() {
        let mut grid = HeightGrid::new(4, 4, 1.0).unwrap();
        grid.set(3, 2, 0.5);
        assert_eq!(grid.get(3, 2), 0.5);
        assert_eq!(grid.elevation[2 * 4 + 3], 0.5);
    }

    #[test]
    fn test_neighbours_are_clamped() {
        let grid = HeightGrid::new(3, 3, 1.0).unwrap();
        assert_eq!(grid.neighbours(4), vec![1, 2, 5, 8, 7, 6, 3, 0]);
        // Corner (0,0): E, SE, S.
        assert_eq!(grid.neighbours(0), vec![1, 4, 3]);
        // Top edge (1,0): E, SE, S, SW, W.
        assert_eq!(grid.neighbours(1), vec![2, 5, 4, 3, 0]);
        assert_eq!(grid.neighbours_with(4, Connectivity::Four), vec![1, 5, 7, 3]);
        assert!(grid.neighbours(9).is_empty());
    }

    #[test]
    fn test_height_range_and_mass() {
        let grid = HeightGrid::from_elevation(2, 2, vec![-0.5, 1.0, 2.0, 0.0], 1.0).unwrap();
        assert_eq!(grid.height_range(), (-0.5, 2.0));
        assert_eq!(grid.total_mass(), 2.5);
    }

    #[test]
    fn test_cell_coords_iterator() {
        let grid = HeightGrid::new(3, 2, 1.0).unwrap();
        let coords: Vec<_> = grid.cell_coords().collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], (0, 0));
        assert_eq!(coords[1], (1, 0));
        assert_eq!(coords[3], (0, 1));
        assert_eq!(coords[5], (2, 1));
    }
}
