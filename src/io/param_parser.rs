use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::disc::boundary::DirichletSegment;
use crate::error::Result;
use crate::stability::StabilityMethod;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Explicit,
    Implicit,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AdvectionParser {
    pub scale: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputParser {
    pub directory: String,
    pub snapshot_stride: usize,
    pub csv: bool,
    pub vtu: bool,
}
impl Default for OutputParser {
    fn default() -> Self {
        Self {
            directory: "outputs".to_string(),
            snapshot_stride: 100,
            csv: true,
            vtu: false,
        }
    }
}

fn default_cfl() -> f64 {
    0.99
}
fn default_stability() -> StabilityMethod {
    StabilityMethod::Gershgorin
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SolverParamParser {
    pub nx: usize,
    pub ny: usize,
    pub lower_corner: [f64; 2],
    pub upper_corner: [f64; 2],
    pub alpha: f64,
    pub final_time: f64,
    /// `None`: `cfl` times the stability limit.
    #[serde(default)]
    pub dt: Option<f64>,
    #[serde(default = "default_cfl")]
    pub cfl: f64,
    pub scheme: Scheme,
    #[serde(default = "default_stability")]
    pub stability: StabilityMethod,
    #[serde(default)]
    pub dirichlet: Vec<DirichletSegment>,
    #[serde(default)]
    pub advection: Option<AdvectionParser>,
    #[serde(default)]
    pub output: OutputParser,
}
impl SolverParamParser {
    pub fn parse(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_content = fs::read_to_string(file_path)?;
        Self::parse_str(&file_content)
    }
    pub fn parse_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
