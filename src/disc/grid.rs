use ndarray::{Array2, Array3};

use crate::error::{Result, SolverError};

/// Uniform rectangular node grid over `[x0, x1] x [y0, y1]`.
///
/// Node `(i, j)` sits at `(x0 + i*hx, y0 + j*hy)`; `i` runs along x and `j`
/// along y. Scalar fields are `(nx, ny)` arrays, so the row-major flattening
/// of a field matches [`Grid::index`].
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    lower_corner: [f64; 2],
    upper_corner: [f64; 2],
    hx: f64,
    hy: f64,
}
impl Grid {
    pub fn new(nx: usize, ny: usize, lower_corner: [f64; 2], upper_corner: [f64; 2]) -> Result<Self> {
        if nx < 2 || ny < 2 {
            return Err(SolverError::InvalidDimension { nx, ny });
        }
        let [x0, y0] = lower_corner;
        let [x1, y1] = upper_corner;
        let hx = (x1 - x0) / (nx - 1) as f64;
        let hy = (y1 - y0) / (ny - 1) as f64;
        if !(hx.is_finite() && hy.is_finite() && hx > 0.0 && hy > 0.0) {
            return Err(SolverError::InvalidDomain { x0, y0, x1, y1 });
        }
        Ok(Self {
            nx,
            ny,
            lower_corner,
            upper_corner,
            hx,
            hy,
        })
    }
    pub fn nx(&self) -> usize {
        self.nx
    }
    pub fn ny(&self) -> usize {
        self.ny
    }
    pub fn lower_corner(&self) -> [f64; 2] {
        self.lower_corner
    }
    pub fn upper_corner(&self) -> [f64; 2] {
        self.upper_corner
    }
    pub fn spacing(&self) -> (f64, f64) {
        (self.hx, self.hy)
    }
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i * self.ny + j
    }
    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn node(&self, index: usize) -> (usize, usize) {
        (index / self.ny, index % self.ny)
    }
    pub fn node_count(&self) -> usize {
        self.nx * self.ny
    }
    pub fn coordinates(&self, i: usize, j: usize) -> (f64, f64) {
        (
            self.lower_corner[0] + i as f64 * self.hx,
            self.lower_corner[1] + j as f64 * self.hy,
        )
    }
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
    /// Zero field with `components` values per node (trailing axis).
    pub fn new_field(&self, components: usize) -> Array3<f64> {
        Array3::zeros((self.nx, self.ny, components))
    }
    pub fn new_scalar_field(&self) -> Array2<f64> {
        Array2::zeros((self.nx, self.ny))
    }
    pub fn scalar_field_from_fn<F>(&self, f: F) -> Array2<f64>
    where
        F: Fn(f64, f64) -> f64,
    {
        Array2::from_shape_fn((self.nx, self.ny), |(i, j)| {
            let (x, y) = self.coordinates(i, j);
            f(x, y)
        })
    }
    pub(crate) fn check_scalar_shape(&self, shape: &[usize]) -> Result<()> {
        if shape != [self.nx, self.ny] {
            return Err(SolverError::ShapeMismatch {
                expected: vec![self.nx, self.ny],
                found: shape.to_vec(),
            });
        }
        Ok(())
    }
}
