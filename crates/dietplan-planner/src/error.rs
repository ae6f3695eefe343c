use dietplan_solver::SolverError;
use thiserror::Error;

use crate::targets::NutrientBound;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("No candidate products")]
    NoCandidates,
    #[error("Cannot pick {requested} distinct products out of {available}")]
    NotEnoughCandidates { requested: usize, available: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid range for {}: {} to {}", .0.nutrient, .0.minimum, .0.maximum)]
    InvalidBound(NutrientBound),
    #[error("A week plan needs {expected} days, got {found}")]
    DayCount { expected: usize, found: usize },
    #[error("Unknown product id {0}")]
    UnknownProduct(u64),
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}
