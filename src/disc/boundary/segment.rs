use serde::{Deserialize, Serialize};

use crate::disc::grid::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoundaryPosition {
    Lower,
    Right,
    Upper,
    Left,
}

/// Constant Dirichlet value on the part of one domain edge whose coordinate
/// along the edge lies in `[lower, upper]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirichletSegment {
    pub position: BoundaryPosition,
    pub lower: f64,
    pub upper: f64,
    pub value: f64,
}
impl DirichletSegment {
    pub fn new(position: BoundaryPosition, lower: f64, upper: f64, value: f64) -> Self {
        Self {
            position,
            lower,
            upper,
            value,
        }
    }
    /// Segment spanning a whole edge.
    pub fn whole_edge(grid: &Grid, position: BoundaryPosition, value: f64) -> Self {
        let (lower, upper) = match position {
            BoundaryPosition::Lower | BoundaryPosition::Upper => {
                (grid.lower_corner()[0], grid.upper_corner()[0])
            }
            BoundaryPosition::Left | BoundaryPosition::Right => {
                (grid.lower_corner()[1], grid.upper_corner()[1])
            }
        };
        Self::new(position, lower, upper, value)
    }
    pub fn contains(&self, grid: &Grid, i: usize, j: usize) -> bool {
        let (x, y) = grid.coordinates(i, j);
        let (hx, hy) = grid.spacing();
        let (on_edge, s, h) = match self.position {
            BoundaryPosition::Lower => (j == 0, x, hx),
            BoundaryPosition::Upper => (j == grid.ny() - 1, x, hx),
            BoundaryPosition::Left => (i == 0, y, hy),
            BoundaryPosition::Right => (i == grid.nx() - 1, y, hy),
        };
        // round-off in i*h must not drop a node sitting on an end point
        let slack = 1e-9 * h;
        on_edge && s >= self.lower - slack && s <= self.upper + slack
    }
}
