use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("grid needs at least 2 nodes per direction, got {nx} x {ny}")]
    InvalidDimension { nx: usize, ny: usize },

    #[error("domain [{x0}, {x1}] x [{y0}, {y1}] does not give a positive finite spacing")]
    InvalidDomain { x0: f64, y0: f64, x1: f64, y1: f64 },

    #[error("field shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("linear system error: {0}")]
    LinearSystem(String),

    /// Only produced by [`crate::temporal_disc::Trajectory::ensure_finite`];
    /// the steppers never stop on a blow-up by themselves.
    #[error("solution diverged (non-finite value) at t = {time}")]
    DivergedSolution { time: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Vtk(#[from] vtkio::Error),
}
