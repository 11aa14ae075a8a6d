use std::path::Path;

use ndarray::Array2;

use crate::{
    disc::{
        boundary::BoundaryMask,
        grid::Grid,
        stencil::StencilOperator,
        wind::wind_field,
    },
    error::{Result, SolverError},
    io::param_parser::{Scheme, SolverParamParser},
    solver::SolverParameters,
};

pub fn initialize_params_by_file(file_path: impl AsRef<Path>) -> Result<SolverParamParser> {
    let solver_param_parser = SolverParamParser::parse(file_path)?;
    check_params(&solver_param_parser)?;
    Ok(solver_param_parser)
}
fn check_params(p: &SolverParamParser) -> Result<()> {
    let invalid = |msg: String| Err(SolverError::InvalidParameter(msg));
    if !(p.alpha.is_finite() && p.alpha > 0.0) {
        return invalid(format!("alpha must be positive, got {}", p.alpha));
    }
    if !(p.final_time.is_finite() && p.final_time >= 0.0) {
        return invalid(format!("final_time must be non-negative, got {}", p.final_time));
    }
    if let Some(dt) = p.dt {
        if !(dt.is_finite() && dt > 0.0) {
            return invalid(format!("dt must be positive, got {dt}"));
        }
    }
    if !(p.cfl.is_finite() && p.cfl > 0.0) {
        return invalid(format!("cfl must be positive, got {}", p.cfl));
    }
    if p.output.snapshot_stride == 0 {
        return invalid("output.snapshot_stride must be at least 1".to_string());
    }
    for segment in p.dirichlet.iter() {
        if !(segment.lower <= segment.upper) {
            return invalid(format!(
                "empty {:?} segment [{}, {}]",
                segment.position, segment.lower, segment.upper
            ));
        }
    }
    Ok(())
}
pub fn initialize_grid(p: &SolverParamParser) -> Result<Grid> {
    Grid::new(p.nx, p.ny, p.lower_corner, p.upper_corner)
}
pub fn initialize_mask(grid: &Grid, p: &SolverParamParser) -> BoundaryMask {
    let mask = BoundaryMask::from_segments(grid, &p.dirichlet);
    if mask.dirichlet_count() == 0 {
        log::info!("no Dirichlet node on the grid: fully insulated domain");
    }
    mask
}
/// Pure diffusion, or convection-diffusion with the coursework wind when
/// `advection` is set.
pub fn initialize_operator(grid: Grid, mask: BoundaryMask, p: &SolverParamParser) -> Result<StencilOperator> {
    match &p.advection {
        Some(advection) => {
            let wind = wind_field(&grid);
            StencilOperator::convection_diffusion(grid, mask, &wind, advection.scale)
        }
        None => StencilOperator::laplacian(grid, mask),
    }
}
/// Zero interior with the Dirichlet values written in.
pub fn initialize_solution(op: &StencilOperator) -> Array2<f64> {
    let mut solution = op.grid().new_scalar_field();
    op.mask().seed(solution.view_mut());
    solution
}
/// Stability limit, computed only when it picks `dt` or checks an explicit run.
fn stability_limit(p: &SolverParamParser, op: &StencilOperator) -> Result<Option<f64>> {
    if p.dt.is_some() && p.scheme == Scheme::Implicit {
        return Ok(None);
    }
    p.stability.timestep(op, p.alpha).map(Some)
}
pub fn initialize_solver_params(p: &SolverParamParser, op: &StencilOperator) -> Result<SolverParameters> {
    let dt_limit = stability_limit(p, op)?;
    let dt = match (p.dt, dt_limit) {
        (Some(dt), _) => dt,
        (None, Some(limit)) if limit.is_finite() && limit > 0.0 => p.cfl * limit,
        // no decaying mode: any step is stable, fall back to the whole run
        (None, Some(limit)) if limit.is_infinite() => p.final_time.max(f64::MIN_POSITIVE),
        (None, limit) => {
            return Err(SolverError::InvalidParameter(format!(
                "no stable explicit timestep exists (limit {limit:?}); set dt or use the implicit scheme"
            )));
        }
    };
    if let Some(limit) = dt_limit {
        if p.scheme == Scheme::Explicit && dt > limit {
            log::warn!(
                "dt = {dt:e} exceeds the {:?} stability limit {limit:e}; explicit Euler may diverge",
                p.stability
            );
        }
    }
    Ok(SolverParameters {
        dt,
        alpha: p.alpha,
        final_time: p.final_time,
        scheme: p.scheme,
        snapshot_stride: p.output.snapshot_stride,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    const COURSEWORK: &str = r#"{
        "nx": 11, "ny": 11,
        "lower_corner": [0.0, 0.0], "upper_corner": [1.0, 1.0],
        "alpha": 1.0, "final_time": 10.0,
        "dt": null, "cfl": 0.5,
        "scheme": "explicit",
        "dirichlet": [
            {"position": "Left", "lower": 0.25, "upper": 0.75, "value": 1.0},
            {"position": "Right", "lower": 0.6, "upper": 0.8, "value": 0.0}
        ]
    }"#;

    #[test]
    fn builds_coursework_problem() {
        let p = SolverParamParser::parse_str(COURSEWORK).unwrap();
        let grid = initialize_grid(&p).unwrap();
        let mask = initialize_mask(&grid, &p);
        assert_eq!(mask.dirichlet_count(), 8);
        let op = initialize_operator(grid, mask, &p).unwrap();
        assert_eq!(op.advection_scale(), None);
        let u0 = initialize_solution(&op);
        assert!(op.mask().is_consistent(u0.view()));
        assert_eq!(u0[[0, 5]], 1.0);
        assert_eq!(u0[[5, 5]], 0.0);

        let params = initialize_solver_params(&p, &op).unwrap();
        // half the Gershgorin limit 0.0025
        assert_relative_eq!(params.dt, 0.00125, max_relative = 1e-12);
        assert_eq!(params.snapshot_stride, 100);
    }

    #[test]
    fn explicit_dt_is_kept_and_advection_is_wired() {
        let mut p = SolverParamParser::parse_str(COURSEWORK).unwrap();
        p.dt = Some(0.003);
        p.advection = Some(crate::io::param_parser::AdvectionParser { scale: 0.5 });
        let grid = initialize_grid(&p).unwrap();
        let mask = initialize_mask(&grid, &p);
        let op = initialize_operator(grid, mask, &p).unwrap();
        assert_eq!(op.advection_scale(), Some(0.5));
        let params = initialize_solver_params(&p, &op).unwrap();
        assert_eq!(params.dt, 0.003);
    }

    #[test]
    fn limit_is_skipped_for_implicit_run_with_given_dt() {
        let mut p = SolverParamParser::parse_str(COURSEWORK).unwrap();
        p.stability = crate::stability::StabilityMethod::Exact;
        let grid = initialize_grid(&p).unwrap();
        let mask = initialize_mask(&grid, &p);
        let op = initialize_operator(grid, mask, &p).unwrap();

        p.scheme = Scheme::Implicit;
        p.dt = Some(0.5);
        assert_eq!(stability_limit(&p, &op).unwrap(), None);
        assert_eq!(initialize_solver_params(&p, &op).unwrap().dt, 0.5);

        // explicit runs and automatic steps still need the limit
        p.dt = None;
        let limit = stability_limit(&p, &op).unwrap().unwrap();
        assert!(limit > 0.0025 && limit < 0.00252, "exact limit {limit}");
        p.scheme = Scheme::Explicit;
        p.dt = Some(0.5);
        assert!(stability_limit(&p, &op).unwrap().is_some());
    }

    #[test]
    fn rejects_bad_run_parameters() {
        let good = SolverParamParser::parse_str(COURSEWORK).unwrap();
        let mut cases = vec![good.clone(); 5];
        cases[0].alpha = 0.0;
        cases[1].dt = Some(-1.0);
        cases[2].final_time = -2.0;
        cases[3].cfl = f64::NAN;
        cases[4].output.snapshot_stride = 0;
        for p in cases.iter() {
            assert!(matches!(check_params(p), Err(SolverError::InvalidParameter(_))), "{p:?}");
        }
        assert!(check_params(&good).is_ok());
    }

    #[test]
    fn file_errors_surface_from_initialization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solverparam.json");
        fs::write(&path, COURSEWORK.replace("\"alpha\": 1.0", "\"alpha\": -1.0")).unwrap();
        assert!(matches!(
            initialize_params_by_file(&path),
            Err(SolverError::InvalidParameter(_))
        ));
        fs::write(&path, COURSEWORK).unwrap();
        assert!(initialize_params_by_file(&path).is_ok());
    }
}
