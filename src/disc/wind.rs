use std::f64::consts::PI;

use ndarray::{Array2, Array3, ArrayView3, Axis};

use super::grid::Grid;
use crate::error::Result;

/// Grid used by the coursework wind plot: 80 x 20 nodes over `[0, 10] x [0, 1]`.
pub fn coursework_grid() -> Result<Grid> {
    Grid::new(80, 20, [0.0, 0.0], [10.0, 1.0])
}

/// Cellular wind `w = (4 sin(2 pi y) cos(pi x / 2), -cos(2 pi y) sin(pi x / 2))`.
///
/// The field is divergence free.
#[inline]
pub fn wind_at(x: f64, y: f64) -> [f64; 2] {
    let wx = 4.0 * (2.0 * PI * y).sin() * (PI * x / 2.0).cos();
    let wy = -(2.0 * PI * y).cos() * (PI * x / 2.0).sin();
    [wx, wy]
}

/// Two-component velocity field sampled on every node.
pub fn wind_field(grid: &Grid) -> Array3<f64> {
    let mut field = grid.new_field(2);
    for i in 0..grid.nx() {
        for j in 0..grid.ny() {
            let (x, y) = grid.coordinates(i, j);
            let [wx, wy] = wind_at(x, y);
            field[[i, j, 0]] = wx;
            field[[i, j, 1]] = wy;
        }
    }
    field
}

/// Pointwise magnitude of a vector field with a trailing component axis.
pub fn wind_speed(field: ArrayView3<f64>) -> Array2<f64> {
    field.map_axis(Axis(2), |w| w.iter().map(|c| c * c).sum::<f64>().sqrt())
}
