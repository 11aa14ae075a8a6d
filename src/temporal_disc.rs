use ndarray::{Array2, ArrayView2};

use crate::error::{Result, SolverError};

pub mod explicit_euler;
pub mod implicit_euler;

pub use explicit_euler::ExplicitEuler;
pub use implicit_euler::ImplicitEuler;

/// Both schemes stop once their convergence measure drops below this.
pub const STEADY_STATE_TOL: f64 = 1e-10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    SteadyState,
    TimeLimitReached,
}
impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub time: f64,
    pub step: usize,
    pub field: Array2<f64>,
}

/// Recorded `(t, u)` sequence of one run. The initial state is always the
/// first snapshot and the final state always the last.
#[derive(Clone, Debug)]
pub struct Trajectory {
    snapshots: Vec<Snapshot>,
    pub state: RunState,
    pub steps: usize,
}
impl Trajectory {
    fn start(u0: ArrayView2<f64>) -> Self {
        Self {
            snapshots: vec![Snapshot {
                time: 0.0,
                step: 0,
                field: u0.to_owned(),
            }],
            state: RunState::Running,
            steps: 0,
        }
    }
    fn record(&mut self, time: f64, step: usize, field: ArrayView2<f64>) {
        self.snapshots.push(Snapshot {
            time,
            step,
            field: field.to_owned(),
        });
    }
    fn finish(&mut self, state: RunState, time: f64, step: usize, field: ArrayView2<f64>) {
        if self.snapshots.last().map(|s| s.step) != Some(step) {
            self.record(time, step, field);
        }
        self.state = state;
        self.steps = step;
        log::info!("integration stopped: {state:?} after {step} steps at t = {time}");
    }
    /// Recorded snapshots in time order, never empty.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
    pub fn final_snapshot(&self) -> &Snapshot {
        // `snapshots` is only grown after `start`
        &self.snapshots[self.snapshots.len() - 1]
    }
    pub fn final_field(&self) -> &Array2<f64> {
        &self.final_snapshot().field
    }
    pub fn final_time(&self) -> f64 {
        self.final_snapshot().time
    }
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }
    pub fn max_norms(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| max_norm(s.field.view())).collect()
    }
    /// Error on the first snapshot holding a NaN or infinity.
    pub fn ensure_finite(&self) -> Result<()> {
        match self
            .snapshots
            .iter()
            .find(|s| s.field.iter().any(|v| !v.is_finite()))
        {
            Some(s) => Err(SolverError::DivergedSolution { time: s.time }),
            None => Ok(()),
        }
    }
}

/// `max |u|`; a NaN anywhere makes the result NaN.
pub fn max_norm(u: ArrayView2<f64>) -> f64 {
    u.iter()
        .map(|v| v.abs())
        .fold(0.0, |m, v| if v > m || v.is_nan() { v } else { m })
}

/// `max |a - b|`, NaN-propagating like [`max_norm`].
pub fn max_norm_diff(a: ArrayView2<f64>, b: ArrayView2<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, |m, v| if v > m || v.is_nan() { v } else { m })
}

/// `dt` and `alpha` must be positive and finite, otherwise the time loop
/// never reaches `final_time`.
pub(crate) fn check_step_params(dt: f64, alpha: f64) -> Result<()> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SolverError::InvalidParameter(format!(
            "dt must be positive and finite, got {dt}"
        )));
    }
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(SolverError::InvalidParameter(format!(
            "alpha must be positive and finite, got {alpha}"
        )));
    }
    Ok(())
}

pub(crate) fn check_final_time(final_time: f64) -> Result<()> {
    if !final_time.is_finite() {
        return Err(SolverError::InvalidParameter(format!(
            "final_time must be finite, got {final_time}"
        )));
    }
    Ok(())
}

/// A time-stepping scheme bound to an operator, `dt` and `alpha`.
pub trait TimeIntegrator {
    /// Advance `u` by one step.
    fn step(&self, u: ArrayView2<f64>) -> Result<Array2<f64>>;
    /// Integrate from `t = 0` until steady state or `t >= final_time`,
    /// keeping every `stride`-th step (plus the first and last state).
    fn integrate_with_stride(
        &self,
        u0: ArrayView2<f64>,
        final_time: f64,
        stride: usize,
    ) -> Result<Trajectory>;
    fn integrate(&self, u0: ArrayView2<f64>, final_time: f64) -> Result<Trajectory> {
        self.integrate_with_stride(u0, final_time, 1)
    }
}
