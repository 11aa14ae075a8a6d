use ndarray::{Array2, Array3, ArrayView2, ArrayViewMut2, s};

use super::boundary::{BoundaryMask, NodeKind, reflect};
use super::grid::Grid;
use crate::error::{Result, SolverError};

const CENTER: usize = 0;
const WEST: usize = 1;
const EAST: usize = 2;
const SOUTH: usize = 3;
const NORTH: usize = 4;

/// Reflected neighbour indices of one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbours {
    pub west: usize,
    pub east: usize,
    pub south: usize,
    pub north: usize,
}

/// Second-difference weights `[1, -2, 1] / h^2` in each direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaplaceWeights {
    pub x: [f64; 3],
    pub y: [f64; 3],
}
impl LaplaceWeights {
    pub fn new(hx: f64, hy: f64) -> Self {
        let ihx2 = 1.0 / (hx * hx);
        let ihy2 = 1.0 / (hy * hy);
        Self {
            x: [ihx2, -2.0 * ihx2, ihx2],
            y: [ihy2, -2.0 * ihy2, ihy2],
        }
    }
}

/// 5-point operator `lap(u) - scale * (w . grad u)` over a [`Grid`].
///
/// The per-node coefficients (center, west, east, south, north) are built once
/// from the spacing, the boundary mask and the optional velocity. The
/// matrix-free [`StencilOperator::apply`] and the dense
/// [`StencilOperator::assemble`] both read them. Dirichlet nodes carry an
/// all-zero row.
#[derive(Clone, Debug)]
pub struct StencilOperator {
    grid: Grid,
    mask: BoundaryMask,
    weights: LaplaceWeights,
    advection_scale: Option<f64>,
    coefficients: Array3<f64>,
}
impl StencilOperator {
    pub fn laplacian(grid: Grid, mask: BoundaryMask) -> Result<Self> {
        Self::build(grid, mask, None)
    }
    /// Laplacian plus first-order upwind advection with `velocity`, an
    /// `(nx, ny, 2)` field, weighted by `scale`.
    pub fn convection_diffusion(
        grid: Grid,
        mask: BoundaryMask,
        velocity: &Array3<f64>,
        scale: f64,
    ) -> Result<Self> {
        let expected = [grid.nx(), grid.ny(), 2];
        if velocity.shape() != expected {
            return Err(SolverError::ShapeMismatch {
                expected: expected.to_vec(),
                found: velocity.shape().to_vec(),
            });
        }
        Self::build(grid, mask, Some((velocity, scale)))
    }
    fn build(grid: Grid, mask: BoundaryMask, advection: Option<(&Array3<f64>, f64)>) -> Result<Self> {
        grid.check_scalar_shape(mask.shape())?;
        let (hx, hy) = grid.spacing();
        let weights = LaplaceWeights::new(hx, hy);
        let mut coefficients = Array3::<f64>::zeros((grid.nx(), grid.ny(), 5));
        for i in 0..grid.nx() {
            for j in 0..grid.ny() {
                if mask.kind(i, j).is_dirichlet() {
                    continue;
                }
                let mut c = coefficients.slice_mut(s![i, j, ..]);
                c[CENTER] = weights.x[1] + weights.y[1];
                c[WEST] = weights.x[0];
                c[EAST] = weights.x[2];
                c[SOUTH] = weights.y[0];
                c[NORTH] = weights.y[2];
                if let Some((velocity, scale)) = advection {
                    // upwind: difference towards the side the flow comes from
                    let ax = scale * velocity[[i, j, 0]] / hx;
                    let ay = scale * velocity[[i, j, 1]] / hy;
                    if ax >= 0.0 {
                        c[CENTER] -= ax;
                        c[WEST] += ax;
                    } else {
                        c[CENTER] += ax;
                        c[EAST] -= ax;
                    }
                    if ay >= 0.0 {
                        c[CENTER] -= ay;
                        c[SOUTH] += ay;
                    } else {
                        c[CENTER] += ay;
                        c[NORTH] -= ay;
                    }
                }
            }
        }
        Ok(Self {
            grid,
            mask,
            weights,
            advection_scale: advection.map(|(_, scale)| scale),
            coefficients,
        })
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn mask(&self) -> &BoundaryMask {
        &self.mask
    }
    pub fn weights(&self) -> LaplaceWeights {
        self.weights
    }
    pub fn advection_scale(&self) -> Option<f64> {
        self.advection_scale
    }
    /// Number of unknowns, the order of the assembled matrix.
    pub fn dof(&self) -> usize {
        self.grid.node_count()
    }
    #[inline]
    pub fn neighbours(&self, i: usize, j: usize) -> Neighbours {
        let (i, j) = (i as isize, j as isize);
        Neighbours {
            west: reflect(i - 1, self.grid.nx()),
            east: reflect(i + 1, self.grid.nx()),
            south: reflect(j - 1, self.grid.ny()),
            north: reflect(j + 1, self.grid.ny()),
        }
    }
    /// Row `index(i, j)` of the operator as (column, coefficient) pairs.
    /// Columns may repeat next to a Neumann edge.
    pub fn row(&self, i: usize, j: usize) -> [(usize, f64); 5] {
        let nb = self.neighbours(i, j);
        let c = self.coefficients.slice(s![i, j, ..]);
        [
            (self.grid.index(i, j), c[CENTER]),
            (self.grid.index(nb.west, j), c[WEST]),
            (self.grid.index(nb.east, j), c[EAST]),
            (self.grid.index(i, nb.south), c[SOUTH]),
            (self.grid.index(i, nb.north), c[NORTH]),
        ]
    }
    pub fn apply(&self, u: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut out = self.grid.new_scalar_field();
        self.apply_into(u, out.view_mut())?;
        Ok(out)
    }
    /// Matrix-free action `out = L u`; Dirichlet nodes get `0`.
    pub fn apply_into(&self, u: ArrayView2<f64>, mut out: ArrayViewMut2<f64>) -> Result<()> {
        self.grid.check_scalar_shape(u.shape())?;
        self.grid.check_scalar_shape(out.shape())?;
        for i in 0..self.grid.nx() {
            for j in 0..self.grid.ny() {
                if let NodeKind::Dirichlet(_) = self.mask.kind(i, j) {
                    out[[i, j]] = 0.0;
                    continue;
                }
                let nb = self.neighbours(i, j);
                let c = self.coefficients.slice(s![i, j, ..]);
                out[[i, j]] = c[WEST] * u[[nb.west, j]]
                    + c[EAST] * u[[nb.east, j]]
                    + c[SOUTH] * u[[i, nb.south]]
                    + c[NORTH] * u[[i, nb.north]]
                    + c[CENTER] * u[[i, j]];
            }
        }
        Ok(())
    }
    /// Dense `N x N` matrix of the operator, `N = nx * ny`, rows and columns
    /// ordered by [`Grid::index`]. Mirrored neighbours that land on the same
    /// column are summed.
    pub fn assemble(&self) -> Array2<f64> {
        let n = self.dof();
        let mut a = Array2::<f64>::zeros((n, n));
        for i in 0..self.grid.nx() {
            for j in 0..self.grid.ny() {
                if self.mask.kind(i, j).is_dirichlet() {
                    continue;
                }
                let r = self.grid.index(i, j);
                for (col, coeff) in self.row(i, j) {
                    a[[r, col]] += coeff;
                }
            }
        }
        a
    }
    /// Gershgorin lower end `a_ii - sum_{j != i} |a_ij|` of row `index(i, j)`,
    /// without assembling the matrix.
    pub fn gershgorin_row(&self, i: usize, j: usize) -> f64 {
        let row = self.row(i, j);
        let diag_col = row[CENTER].0;
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(5);
        for (col, coeff) in row {
            match merged.iter_mut().find(|(c, _)| *c == col) {
                Some((_, acc)) => *acc += coeff,
                None => merged.push((col, coeff)),
            }
        }
        merged.iter().fold(0.0, |acc, &(col, coeff)| {
            if col == diag_col {
                acc + coeff
            } else {
                acc - coeff.abs()
            }
        })
    }
}
