use arrayvec::ArrayVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Largest neighbour fan-out of any topology.
pub const MAX_NEIGHBORS: usize = 8;

/// Upper bound on `width * height`. Half of the node index space is reserved for the
/// partial-move overlay.
pub const MAX_GRID_CELLS: i64 = (u32::MAX / 4) as i64;

/// Integer grid coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Neighbourhood model of the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Topology {
    /// Pointy hexes in "odd-r" offset layout: odd rows are shoved half a cell to the right.
    #[default]
    Hex,
    /// Square cells with diagonal moves.
    Octile,
}

// Fixed order for determinism: E, NE, NW, W, SW, SE.
const HEX_EVEN_ROW: [(i32, i32); 6] = [(1, 0), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1)];
const HEX_ODD_ROW: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (0, 1), (1, 1)];
const OCTILE: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Topology {
    pub const fn max_neighbors(self) -> usize {
        match self {
            Topology::Hex => 6,
            Topology::Octile => 8,
        }
    }

    fn offsets(self, y: i32) -> &'static [(i32, i32)] {
        match self {
            Topology::Hex if y & 1 == 0 => &HEX_EVEN_ROW,
            Topology::Hex => &HEX_ODD_ROW,
            Topology::Octile => &OCTILE,
        }
    }
}

/// Grid dimensions, wrap rules and topology.
///
/// This is also the "shape" handed to policies through [`crate::Query`] so heuristics can use
/// wrap-aware distances without holding a reference to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wrap_x: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub wrap_y: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub topology: Topology,
}

impl GridConfig {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            wrap_x: false,
            wrap_y: false,
            topology: Topology::Hex,
        }
    }

    pub fn with_wrap(mut self, wrap_x: bool, wrap_y: bool) -> Self {
        self.wrap_x = wrap_x;
        self.wrap_y = wrap_y;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        if width <= 0 || height <= 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        if width as i64 * height as i64 > MAX_GRID_CELLS {
            return Err(ConfigError::GridTooLarge { width, height });
        }
        // Wrapping an odd number of offset rows would flip row parity across the seam.
        if self.topology == Topology::Hex && self.wrap_y && height % 2 != 0 {
            return Err(ConfigError::OddHexWrapHeight { height });
        }
        Ok(())
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// True if `cell` lies inside the grid without applying any wrapping.
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Fold `cell` back onto the grid along wrapping axes.
    ///
    /// Returns `None` when the cell falls off a non-wrapping edge.
    pub fn wrap(&self, cell: Cell) -> Option<Cell> {
        let x = if self.wrap_x {
            cell.x.rem_euclid(self.width)
        } else {
            cell.x
        };
        let y = if self.wrap_y {
            cell.y.rem_euclid(self.height)
        } else {
            cell.y
        };
        let wrapped = Cell::new(x, y);
        self.contains(wrapped).then_some(wrapped)
    }

    #[inline]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some((cell.y * self.width + cell.x) as usize)
    }

    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        let index = index as i32;
        Cell::new(index % self.width, index / self.width)
    }

    /// Adjacent cells of `cell`, wrapped, in a fixed direction order.
    ///
    /// Duplicates (possible on very narrow wrapping grids) and the cell itself are skipped.
    pub fn neighbors(&self, cell: Cell) -> ArrayVec<Cell, MAX_NEIGHBORS> {
        let mut out = ArrayVec::new();
        for &(dx, dy) in self.topology.offsets(cell.y) {
            let Some(next) = self.wrap(Cell::new(cell.x + dx, cell.y + dy)) else {
                continue;
            };
            if next != cell && !out.contains(&next) {
                out.push(next);
            }
        }
        out
    }

    pub fn is_neighbor(&self, a: Cell, b: Cell) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Step distance between two cells, taking the shortest route across wrapping seams.
    pub fn distance(&self, a: Cell, b: Cell) -> i32 {
        match self.topology {
            Topology::Octile => {
                let dx = wrapped_delta(b.x - a.x, self.width, self.wrap_x);
                let dy = wrapped_delta(b.y - a.y, self.height, self.wrap_y);
                dx.max(dy)
            }
            Topology::Hex => {
                let shifts_x: &[i32] = if self.wrap_x { &[-1, 0, 1] } else { &[0] };
                let shifts_y: &[i32] = if self.wrap_y { &[-1, 0, 1] } else { &[0] };
                let mut best = i32::MAX;
                for &sx in shifts_x {
                    for &sy in shifts_y {
                        let shifted = Cell::new(b.x + sx * self.width, b.y + sy * self.height);
                        best = best.min(hex_distance(a, shifted));
                    }
                }
                best
            }
        }
    }
}

fn wrapped_delta(delta: i32, extent: i32, wraps: bool) -> i32 {
    let delta = delta.abs();
    if wraps {
        delta.min(extent - delta)
    } else {
        delta
    }
}

fn to_axial(cell: Cell) -> (i32, i32) {
    let q = cell.x - (cell.y - (cell.y & 1)) / 2;
    (q, cell.y)
}

fn hex_distance(a: Cell, b: Cell) -> i32 {
    let (aq, ar) = to_axial(a);
    let (bq, br) = to_axial(b);
    let dq = aq - bq;
    let dr = ar - br;
    (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_neighbors_are_mutual() {
        let grid = GridConfig::new(7, 6);
        for y in 0..6 {
            for x in 0..7 {
                let cell = Cell::new(x, y);
                for n in grid.neighbors(cell) {
                    assert!(grid.neighbors(n).contains(&cell), "{cell:?} <-> {n:?}");
                    assert_eq!(grid.distance(cell, n), 1);
                }
            }
        }
    }

    #[test]
    fn interior_cells_have_full_fan_out() {
        let hex = GridConfig::new(5, 5);
        let octile = hex.with_topology(Topology::Octile);
        assert_eq!(hex.neighbors(Cell::new(2, 2)).len(), 6);
        assert_eq!(octile.neighbors(Cell::new(2, 2)).len(), 8);
        assert_eq!(octile.neighbors(Cell::new(0, 0)).len(), 3);
    }

    #[test]
    fn wrap_folds_only_wrapping_axes() {
        let grid = GridConfig::new(4, 4).with_wrap(true, false);
        assert_eq!(grid.wrap(Cell::new(-1, 2)), Some(Cell::new(3, 2)));
        assert_eq!(grid.wrap(Cell::new(4, 0)), Some(Cell::new(0, 0)));
        assert_eq!(grid.wrap(Cell::new(0, -1)), None);
    }

    #[test]
    fn distances_cross_the_seam() {
        let octile = GridConfig::new(10, 10)
            .with_topology(Topology::Octile)
            .with_wrap(true, true);
        assert_eq!(octile.distance(Cell::new(0, 0), Cell::new(9, 9)), 1);
        assert_eq!(octile.distance(Cell::new(0, 0), Cell::new(5, 5)), 5);

        let hex = GridConfig::new(10, 10).with_wrap(true, true);
        assert_eq!(hex.distance(Cell::new(0, 0), Cell::new(9, 0)), 1);
        assert_eq!(hex.distance(Cell::new(0, 0), Cell::new(0, 9)), 1);
    }

    #[test]
    fn hex_distance_on_plain_grid() {
        let grid = GridConfig::new(8, 8);
        assert_eq!(grid.distance(Cell::new(0, 0), Cell::new(7, 7)), 11);
        assert_eq!(grid.distance(Cell::new(0, 0), Cell::new(5, 0)), 5);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        assert!(GridConfig::new(0, 3).validate().is_err());
        assert_eq!(
            GridConfig::new(4, 5).with_wrap(false, true).validate(),
            Err(ConfigError::OddHexWrapHeight { height: 5 })
        );
        assert!(GridConfig::new(4, 5)
            .with_topology(Topology::Octile)
            .with_wrap(false, true)
            .validate()
            .is_ok());
    }
}
