//! Edge-clamped and toroidal neighbour lookup on a rectangular grid.
//!
//! Routing, flux, soil and depression filling clamp at the grid edges; only the
//! thermal eroder wraps. Both policies live here so they can be tested side by side.

use serde::{Deserialize, Serialize};

/// One of the eight compass directions. `N` is towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// All eight directions in tie-break order.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// The four cardinal directions in tie-break order.
    pub const CARDINAL: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    /// Returns the `(dx, dy)` step for this direction.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
        }
    }

    /// True for NE, SE, SW and NW.
    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.offset();
        dx != 0 && dy != 0
    }

    /// Horizontal distance in cell units: 1 for cardinals, sqrt(2) for diagonals.
    pub fn distance(self) -> f64 {
        if self.is_diagonal() {
            std::f64::consts::SQRT_2
        } else {
            1.0
        }
    }
}

/// Which neighbours take part in routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// N, E, S, W.
    Four,
    /// All eight directions.
    #[default]
    Eight,
}

impl Connectivity {
    /// Maps the `allow_diagonals` option onto a connectivity.
    pub fn from_diagonals(allow_diagonals: bool) -> Self {
        if allow_diagonals {
            Connectivity::Eight
        } else {
            Connectivity::Four
        }
    }

    /// Directions enumerated for this connectivity, in tie-break order.
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Connectivity::Four => &Direction::CARDINAL,
            Connectivity::Eight => &Direction::ALL,
        }
    }
}

/// Returns the neighbour of `(x, y)` in `dir`, or `None` if it falls off the grid.
#[inline]
pub fn neighbor_clamped(
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    dir: Direction,
) -> Option<(usize, usize)> {
    debug_assert!(x < width && y < height);
    let (dx, dy) = dir.offset();
    let nx = x as i64 + dx;
    let ny = y as i64 + dy;
    if (0..width as i64).contains(&nx) && (0..height as i64).contains(&ny) {
        Some((nx as usize, ny as usize))
    } else {
        None
    }
}

/// Returns the neighbour of `(x, y)` in `dir`, wrapping both axes.
#[inline]
pub fn neighbor_wrapped(width: usize, height: usize, x: usize, y: usize, dir: Direction) -> (usize, usize) {
    debug_assert!(x < width && y < height);
    let (dx, dy) = dir.offset();
    let nx = (x as i64 + dx).rem_euclid(width as i64);
    let ny = (y as i64 + dy).rem_euclid(height as i64);
    (nx as usize, ny as usize)
}

/// Clamped neighbours of `(x, y)` as `(direction, index)` pairs, in tie-break order.
pub fn neighbors_clamped(
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    connectivity: Connectivity,
) -> impl Iterator<Item = (Direction, usize)> {
    connectivity.directions().iter().filter_map(move |&dir| {
        neighbor_clamped(width, height, x, y, dir).map(|(nx, ny)| (dir, ny * width + nx))
    })
}

/// True if `(x, y)` lies on the outer ring of the grid.
#[inline]
pub fn is_border(width: usize, height: usize, x: usize, y: usize) -> bool {
    x == 0 || y == 0 || x + 1 == width || y + 1 == height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_cell_has_eight_neighbors() {
        let n: Vec<_> = neighbors_clamped(3, 3, 1, 1, Connectivity::Eight).collect();
        assert_eq!(n.len(), 8);
        // N, NE, E, SE, S, SW, W, NW around the centre of a 3x3 grid.
        let idx: Vec<usize> = n.iter().map(|&(_, i)| i).collect();
        assert_eq!(idx, vec![1, 2, 5, 8, 7, 6, 3, 0]);
    }

    #[test]
    fn test_edge_and_corner_counts() {
        assert_eq!(neighbors_clamped(4, 4, 0, 0, Connectivity::Eight).count(), 3);
        assert_eq!(neighbors_clamped(4, 4, 1, 0, Connectivity::Eight).count(), 5);
        assert_eq!(neighbors_clamped(4, 4, 0, 0, Connectivity::Four).count(), 2);
        assert_eq!(neighbors_clamped(4, 1, 0, 0, Connectivity::Eight).count(), 1);
        assert_eq!(neighbors_clamped(1, 1, 0, 0, Connectivity::Eight).count(), 0);
    }

    #[test]
    fn test_wrapped_neighbor_crosses_edges() {
        assert_eq!(neighbor_wrapped(5, 4, 0, 0, Direction::NW), (4, 3));
        assert_eq!(neighbor_wrapped(5, 4, 4, 3, Direction::SE), (0, 0));
        assert_eq!(neighbor_wrapped(5, 4, 2, 2, Direction::E), (3, 2));
        // Degenerate single-row grid wraps onto itself vertically.
        assert_eq!(neighbor_wrapped(3, 1, 1, 0, Direction::N), (1, 0));
    }

    #[test]
    fn test_clamped_neighbor_does_not_wrap() {
        assert_eq!(neighbor_clamped(5, 4, 0, 0, Direction::W), None);
        assert_eq!(neighbor_clamped(5, 4, 4, 3, Direction::SE), None);
        assert_eq!(neighbor_clamped(5, 4, 4, 3, Direction::NW), Some((3, 2)));
    }

    #[test]
    fn test_direction_distances() {
        for dir in Direction::ALL {
            let expected = if dir.is_diagonal() { std::f64::consts::SQRT_2 } else { 1.0 };
            assert_eq!(dir.distance(), expected);
        }
        assert!(Direction::CARDINAL.iter().all(|d| !d.is_diagonal()));
    }

    #[test]
    fn test_border_detection() {
        assert!(is_border(5, 5, 0, 2));
        assert!(is_border(5, 5, 4, 4));
        assert!(!is_border(5, 5, 2, 2));
        assert!(is_border(1, 1, 0, 0));
    }
}
