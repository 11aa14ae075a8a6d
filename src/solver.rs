use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::{
    disc::{stencil::StencilOperator, wind::wind_field},
    error::Result,
    initialization::{
        initialize_grid, initialize_mask, initialize_operator, initialize_solution,
        initialize_solver_params,
    },
    io::{
        param_parser::{OutputParser, Scheme, SolverParamParser},
        write_to_csv::{write_history, write_to_csv, write_wind_to_csv},
        write_to_vtu::write_nodal_solution,
    },
    temporal_disc::{ExplicitEuler, ImplicitEuler, RunState, TimeIntegrator, Trajectory},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverParameters {
    pub dt: f64,
    pub alpha: f64,
    pub final_time: f64,
    pub scheme: Scheme,
    pub snapshot_stride: usize,
}

/// One configured run: operator, initial field and resolved timestep.
pub struct HeatSolver {
    pub op: StencilOperator,
    pub solutions: Array2<f64>,
    pub solver_params: SolverParameters,
    pub output: OutputParser,
}
impl HeatSolver {
    pub fn new(p: &SolverParamParser) -> Result<Self> {
        let grid = initialize_grid(p)?;
        let mask = initialize_mask(&grid, p);
        let op = initialize_operator(grid, mask, p)?;
        let solutions = initialize_solution(&op);
        let solver_params = initialize_solver_params(p, &op)?;
        Ok(Self {
            op,
            solutions,
            solver_params,
            output: p.output.clone(),
        })
    }
    fn integrator(&self) -> Result<Box<dyn TimeIntegrator + '_>> {
        let SolverParameters { dt, alpha, .. } = self.solver_params;
        Ok(match self.solver_params.scheme {
            Scheme::Explicit => Box::new(ExplicitEuler::new(&self.op, dt, alpha)?),
            Scheme::Implicit => Box::new(ImplicitEuler::new(&self.op, dt, alpha)?),
        })
    }
    pub fn solve(&self) -> Result<Trajectory> {
        let integrator = self.integrator()?;
        let trajectory = integrator.integrate_with_stride(
            self.solutions.view(),
            self.solver_params.final_time,
            self.solver_params.snapshot_stride,
        )?;
        if let Err(e) = trajectory.ensure_finite() {
            log::warn!("{e}");
        }
        Ok(trajectory)
    }
    /// Writes the recorded snapshots, the norm history and, for advective
    /// runs, the wind field into `output.directory`.
    pub fn write_outputs(&self, trajectory: &Trajectory) -> Result<Vec<PathBuf>> {
        let dir = Path::new(&self.output.directory);
        fs::create_dir_all(dir)?;
        let grid = self.op.grid();
        let mut written = Vec::new();
        for snapshot in trajectory.snapshots().iter() {
            if self.output.csv {
                let path = dir.join(format!("u_{:06}.csv", snapshot.step));
                write_to_csv(snapshot.field.view(), grid, &path)?;
                written.push(path);
            }
            if self.output.vtu {
                let path = dir.join(format!("u_{:06}.vtu", snapshot.step));
                write_nodal_solution(snapshot.field.view(), grid, snapshot.time, &path)?;
                written.push(path);
            }
        }
        let path = dir.join("history.csv");
        write_history(trajectory, &path)?;
        written.push(path);
        if self.op.advection_scale().is_some() {
            let path = dir.join("wind.csv");
            write_wind_to_csv(wind_field(grid).view(), grid, &path)?;
            written.push(path);
        }
        log::debug!("wrote {} files to {}", written.len(), dir.display());
        Ok(written)
    }
    pub fn run(&self) -> Result<Trajectory> {
        let trajectory = self.solve()?;
        match trajectory.state {
            RunState::SteadyState => log::info!(
                "steady state after {} steps, t = {}",
                trajectory.steps,
                trajectory.final_time()
            ),
            _ => log::info!(
                "stopped at t = {} after {} steps",
                trajectory.final_time(),
                trajectory.steps
            ),
        }
        self.write_outputs(&trajectory)?;
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal_disc::max_norm_diff;
    use approx::assert_relative_eq;

    fn coursework(scheme: &str, dir: &Path) -> SolverParamParser {
        let content = format!(
            r#"{{
            "nx": 11, "ny": 11,
            "lower_corner": [0.0, 0.0], "upper_corner": [1.0, 1.0],
            "alpha": 1.0, "final_time": 10.0,
            "dt": null, "cfl": 1.0,
            "scheme": "{scheme}",
            "dirichlet": [
                {{"position": "Left", "lower": 0.25, "upper": 0.75, "value": 1.0}},
                {{"position": "Right", "lower": 0.6, "upper": 0.8, "value": 0.0}}
            ],
            "output": {{"directory": {dir:?}, "snapshot_stride": 1000, "csv": true, "vtu": true}}
        }}"#,
            dir = dir.to_string_lossy()
        );
        SolverParamParser::parse_str(&content).unwrap()
    }

    #[test]
    fn explicit_run_writes_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let solver = HeatSolver::new(&coursework("explicit", dir.path())).unwrap();
        assert_relative_eq!(solver.solver_params.dt, 0.0025, max_relative = 1e-12);
        let trajectory = solver.run().unwrap();
        assert_eq!(trajectory.state, RunState::SteadyState);
        // initial, step 1000, step 2000 and the converged state
        assert_eq!(trajectory.snapshots().len(), 4);
        let last = trajectory.final_snapshot().step;
        assert!(dir.path().join(format!("u_{last:06}.csv")).exists());
        assert!(dir.path().join(format!("u_{last:06}.vtu")).exists());
        assert!(dir.path().join("u_000000.csv").exists());
        assert!(dir.path().join("history.csv").exists());
        assert!(!dir.path().join("wind.csv").exists());
    }

    #[test]
    fn implicit_and_explicit_runs_agree() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = HeatSolver::new(&coursework("explicit", dir.path()))
            .unwrap()
            .solve()
            .unwrap();
        let mut p = coursework("implicit", dir.path());
        p.dt = Some(1.0);
        p.final_time = 100.0;
        let implicit = HeatSolver::new(&p).unwrap().solve().unwrap();
        assert_eq!(implicit.state, RunState::SteadyState);
        let gap = max_norm_diff(explicit.final_field().view(), implicit.final_field().view());
        assert!(gap < 1e-6, "steady states differ by {gap}");
    }

    #[test]
    fn advective_run_exports_wind() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = coursework("explicit", dir.path());
        p.advection = Some(crate::io::param_parser::AdvectionParser { scale: 0.1 });
        p.final_time = 0.05;
        p.output.vtu = false;
        let solver = HeatSolver::new(&p).unwrap();
        let written = solver.write_outputs(&solver.solve().unwrap()).unwrap();
        assert!(written.contains(&dir.path().join("wind.csv")));
        assert!(written.iter().all(|f| f.extension().is_some_and(|e| e == "csv")));
    }
}
