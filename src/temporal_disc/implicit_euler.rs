use faer::{Col, linalg::solvers::PartialPivLu, prelude::Solve};
use faer_ext::IntoFaer;
use ndarray::{Array1, Array2, ArrayView2};

use super::{
    RunState, STEADY_STATE_TOL, TimeIntegrator, Trajectory, check_final_time, check_step_params,
    max_norm_diff,
};
use crate::disc::stencil::StencilOperator;
use crate::error::{Result, SolverError};

/// Backward Euler: solves `(I - dt alpha L) u_{n+1} = u_n` every step.
///
/// `M = I - dt alpha L` does not depend on time and is factorized once in
/// [`ImplicitEuler::new`]. Dirichlet rows of `L` are zero, so the matching
/// rows of `M` are identity rows and those nodes keep their value.
pub struct ImplicitEuler<'a> {
    op: &'a StencilOperator,
    dt: f64,
    alpha: f64,
    lu: PartialPivLu<f64>,
}
impl<'a> ImplicitEuler<'a> {
    pub fn new(op: &'a StencilOperator, dt: f64, alpha: f64) -> Result<Self> {
        check_step_params(dt, alpha)?;
        let mut m = op.assemble();
        m *= -dt * alpha;
        m.diag_mut().map_inplace(|d| *d += 1.0);
        log::debug!("factorizing {n} x {n} implicit Euler system", n = m.nrows());
        let lu = m.view().into_faer().partial_piv_lu();
        // a zero pivot or an overflowed entry shows up as a non-finite solution
        let n = m.nrows();
        let ones = Col::<f64>::from_iter(std::iter::repeat_n(1.0, n));
        let x = lu.solve(&ones);
        if x.subrows(0, n).iter().any(|v| !v.is_finite()) {
            return Err(SolverError::LinearSystem(format!(
                "I - dt*alpha*L is singular or overflows for dt = {dt}, alpha = {alpha}"
            )));
        }
        Ok(Self { op, dt, alpha, lu })
    }
    pub fn dt(&self) -> f64 {
        self.dt
    }
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
impl TimeIntegrator for ImplicitEuler<'_> {
    fn step(&self, u: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.op.grid().check_scalar_shape(u.shape())?;
        let n = self.op.dof();
        let b = Col::<f64>::from_iter(u.iter().copied());
        let x = self.lu.solve(&b);
        let next = Array1::from_iter(x.subrows(0, n).iter().copied());
        next.into_shape_with_order(u.raw_dim())
            .map_err(|e| SolverError::LinearSystem(e.to_string()))
    }
    fn integrate_with_stride(
        &self,
        u0: ArrayView2<f64>,
        final_time: f64,
        stride: usize,
    ) -> Result<Trajectory> {
        check_final_time(final_time)?;
        let stride = stride.max(1);
        let mut traj = Trajectory::start(u0);
        let mut u = u0.to_owned();
        let mut t = 0.0;
        let mut step = 0;
        log::info!(
            "implicit Euler: dt = {}, alpha = {}, T = {final_time}, {} nodes",
            self.dt,
            self.alpha,
            self.op.dof()
        );
        let state = loop {
            if t >= final_time {
                break RunState::TimeLimitReached;
            }
            let next = self.step(u.view())?;
            let change = max_norm_diff(next.view(), u.view());
            u = next;
            step += 1;
            t = step as f64 * self.dt;
            if change < STEADY_STATE_TOL {
                break RunState::SteadyState;
            }
            if step % stride == 0 {
                traj.record(t, step, u.view());
            }
        };
        traj.finish(state, t, step, u.view());
        Ok(traj)
    }
}
