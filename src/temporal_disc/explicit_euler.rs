use ndarray::{Array2, ArrayView2, Zip};

use super::{
    RunState, STEADY_STATE_TOL, TimeIntegrator, Trajectory, check_final_time, check_step_params,
    max_norm,
};
use crate::disc::stencil::StencilOperator;
use crate::error::Result;

/// Forward Euler `u <- u + dt alpha L u` with the matrix-free operator.
///
/// No stability check is made; past the CFL limit the solution grows without
/// bound and the NaN / infinity ends up in the snapshots.
pub struct ExplicitEuler<'a> {
    op: &'a StencilOperator,
    dt: f64,
    alpha: f64,
}
impl<'a> ExplicitEuler<'a> {
    pub fn new(op: &'a StencilOperator, dt: f64, alpha: f64) -> Result<Self> {
        check_step_params(dt, alpha)?;
        Ok(Self { op, dt, alpha })
    }
    pub fn dt(&self) -> f64 {
        self.dt
    }
    /// Rate `f(u) = L u`, zero on Dirichlet nodes.
    pub fn rate(&self, u: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.op.apply(u)
    }
    fn update(&self, mut u: Array2<f64>, f: &Array2<f64>) -> Array2<f64> {
        let c = self.dt * self.alpha;
        Zip::from(&mut u).and(f).for_each(|u, &f| *u += c * f);
        u
    }
}
impl TimeIntegrator for ExplicitEuler<'_> {
    fn step(&self, u: ArrayView2<f64>) -> Result<Array2<f64>> {
        let f = self.rate(u)?;
        Ok(self.update(u.to_owned(), &f))
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
        let mut f = self.op.grid().new_scalar_field();
        let mut t = 0.0;
        let mut step = 0;
        log::info!(
            "explicit Euler: dt = {}, alpha = {}, T = {final_time}, {} nodes",
            self.dt,
            self.alpha,
            self.op.dof()
        );
        let state = loop {
            if t >= final_time {
                break RunState::TimeLimitReached;
            }
            self.op.apply_into(u.view(), f.view_mut())?;
            // checked before the update: a converged state takes no further step
            if max_norm(f.view()) < STEADY_STATE_TOL {
                break RunState::SteadyState;
            }
            u = self.update(u, &f);
            step += 1;
            t = step as f64 * self.dt;
            if step % stride == 0 {
                traj.record(t, step, u.view());
            }
        };
        traj.finish(state, t, step, u.view());
        Ok(traj)
    }
}
