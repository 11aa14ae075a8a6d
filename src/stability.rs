//! Explicit-Euler stability limits of an assembled or matrix-free operator.
//!
//! Forward Euler on `u' = alpha L u` is stable while `|1 + dt alpha lambda| <= 1`
//! for every eigenvalue of `L`, i.e. `dt alpha <= -2 Re(lambda) / |lambda|^2`.
//! For a real spectrum in `[lambda_min, 0]` that is `dt <= -2 / (alpha lambda_min)`.
//! The exact path computes the spectrum (small grids only), the Gershgorin
//! path bounds it by discs that touch the origin and never returns a larger
//! timestep than the exact one.
use faer::c64;
use faer_ext::IntoFaer;
use ndarray::{Array1, ArrayView2};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};

use crate::disc::stencil::StencilOperator;
use crate::error::{Result, SolverError};

/// Eigenvalues below this fraction of the spectral radius count as zero.
const NULL_EIGENVALUE_TOL: f64 = 1e-10;

/// All eigenvalues of the square matrix `a`.
pub fn eigenvalues(a: ArrayView2<f64>) -> Result<Vec<c64>> {
    a.into_faer()
        .eigenvalues()
        .map_err(|e| SolverError::LinearSystem(format!("eigenvalue solve failed: {e:?}")))
}

/// Smallest real part of the spectrum.
pub fn eig_min(a: ArrayView2<f64>) -> Result<f64> {
    let re: Array1<f64> = eigenvalues(a)?.iter().map(|z| z.re).collect();
    Ok(*re.min_skipnan())
}

/// `min_i (a_ii - sum_{j != i} |a_ij|)`.
pub fn gershgorin_min(a: ArrayView2<f64>) -> f64 {
    let lower: Array1<f64> = a
        .outer_iter()
        .enumerate()
        .map(|(r, row)| {
            let off: f64 = row
                .iter()
                .enumerate()
                .filter(|&(c, _)| c != r)
                .map(|(_, v)| v.abs())
                .sum();
            row[r] - off
        })
        .collect();
    *lower.min_skipnan()
}

/// `-2 / lambda_min`, or infinity when no eigenvalue is negative.
pub fn max_stable_dt(lambda_min: f64) -> f64 {
    if lambda_min < 0.0 {
        -2.0 / lambda_min
    } else {
        f64::INFINITY
    }
}

/// `min -2 Re(lambda) / |lambda|^2` over the non-null eigenvalues, zero when
/// one of them has a non-negative real part, infinity when all are null.
pub fn max_stable_dt_spectrum(spectrum: &[c64]) -> f64 {
    let radius = spectrum.iter().map(|z| z.norm()).fold(0.0, f64::max);
    spectrum
        .iter()
        .filter(|z| z.norm() > NULL_EIGENVALUE_TOL * radius)
        .map(|z| (-2.0 * z.re / z.norm_sqr()).max(0.0))
        .fold(f64::INFINITY, f64::min)
}

pub fn max_stable_dt_exact(a: ArrayView2<f64>) -> Result<f64> {
    Ok(max_stable_dt_spectrum(&eigenvalues(a)?))
}

pub fn max_stable_dt_gershgorin(a: ArrayView2<f64>) -> f64 {
    max_stable_dt(gershgorin_min(a))
}

/// Gershgorin limit computed row by row from the stencil, O(N) work and no
/// `N x N` storage.
pub fn max_stable_dt_matrix_free(op: &StencilOperator) -> f64 {
    let grid = op.grid();
    let mut lower = f64::INFINITY;
    for i in 0..grid.nx() {
        for j in 0..grid.ny() {
            lower = lower.min(op.gershgorin_row(i, j));
        }
    }
    max_stable_dt(lower)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityMethod {
    Exact,
    Gershgorin,
}
impl StabilityMethod {
    /// Largest stable explicit timestep for `u' = alpha L u`.
    pub fn timestep(&self, op: &StencilOperator, alpha: f64) -> Result<f64> {
        let dt = match self {
            StabilityMethod::Exact => max_stable_dt_exact(op.assemble().view())?,
            StabilityMethod::Gershgorin => max_stable_dt_matrix_free(op),
        };
        log::debug!("{self:?} stability limit: dt_max = {dt:e} (alpha = {alpha})");
        Ok(dt / alpha)
    }
}
