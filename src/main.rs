use heat_stencil::{error::SolverError, initialization, solver::HeatSolver};

fn main() -> Result<(), SolverError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let file_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "inputs/solverparam.json".to_string());
    log::info!("reading parameters from {file_path}");
    let solver_param_parser = initialization::initialize_params_by_file(&file_path)?;
    let solver = HeatSolver::new(&solver_param_parser)?;
    let trajectory = solver.run()?;
    println!(
        "{:?} at t = {} ({} steps), max |u| = {}",
        trajectory.state,
        trajectory.final_time(),
        trajectory.steps,
        trajectory.max_norms().last().copied().unwrap_or(f64::NAN)
    );
    Ok(())
}
